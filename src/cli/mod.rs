use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- OCI Credential Args ---
    /// Path to the OCI credential file (a leading `~` expands to the home directory)
    #[arg(long, env = "OCI_CONFIG_FILE", default_value = "~/.oci/config")]
    pub oci_config_file: String,

    /// Profile section to read from the OCI credential file
    #[arg(long, env = "OCI_CONFIG_PROFILE", default_value = "DEFAULT")]
    pub oci_config_profile: String,

    /// Compartment OCID sent with every inference request (required)
    #[arg(long, env = "OCI_COMPARTMENT_ID")]
    pub oci_compartment_id: Option<String>,

    // --- Inference Service Args ---
    /// Generative AI inference endpoint for the target region
    #[arg(
        long,
        env = "OCI_SERVICE_ENDPOINT",
        default_value = "https://inference.generativeai.us-chicago-1.oci.oraclecloud.com"
    )]
    pub oci_service_endpoint: String,

    /// Model used for text-only conversations
    #[arg(long, env = "OCI_MODEL_ID", default_value = "meta.llama-3.3-70b-instruct")]
    pub oci_model_id: String,

    /// Model used for requests that carry images
    #[arg(long, env = "OCI_VISION_MODEL_ID", default_value = "meta.llama-3.2-90b-vision-instruct")]
    pub oci_vision_model_id: String,

    /// Seconds allowed to establish the upstream connection.
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Seconds allowed for a full upstream round trip.
    #[arg(long, env = "READ_TIMEOUT_SECS", default_value = "240")]
    pub read_timeout_secs: u64,

    /// Optional JSON file overriding the built-in assistant prompts.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- HTTP Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    /// The only browser origin allowed by CORS.
    #[arg(long, env = "FRONTEND_ORIGIN", default_value = "http://localhost:3000")]
    pub frontend_origin: String,

    /// Maximum accepted request body in bytes (multipart uploads included).
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "20971520")]
    pub max_upload_bytes: usize,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Run the OCI connection diagnostic and exit instead of serving.
    #[arg(long, env = "CHECK", default_value = "false")]
    pub check: bool,
}
