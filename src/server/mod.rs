pub mod api;
pub mod error;

use crate::assistant::Assistant;
use crate::cli::Args;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    assistant: Arc<Assistant>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, assistant: Arc<Assistant>, args: Args) -> Self {
        Self {
            addr,
            assistant,
            args,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = api::router(self.assistant.clone())?;
        api::start_http_server(&self.addr, app, &self.args).await
    }
}
