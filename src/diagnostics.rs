//! `--check`: step-by-step verification of the OCI setup.

use crate::cli::Args;
use crate::config::{ expand_home, oci, AppConfig };
use crate::llm::oci::OciChatClient;
use crate::llm::signer::RequestSigner;
use crate::llm::types::ChatMessage;
use crate::llm::{ GatewayError, InferenceClient };

const PROBE_MESSAGE: &str = "Reply only with: OK";

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}", "=".repeat(60));
}

fn print_status(check: &str, ok: bool, detail: &str) {
    println!("{} {}", if ok { "✅" } else { "❌" }, check);
    if !detail.is_empty() {
        println!("   └─ {}", detail);
    }
}

/// Shortens OCIDs so they can be printed without exposing the whole value.
pub fn abbreviate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if value.contains("ocid1") && chars.len() > 40 {
        let head: String = chars[..30].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        value.to_string()
    }
}

/// Remediation hints for a failed live check.
fn hints(err: &GatewayError) -> Vec<&'static str> {
    let text = format!("{} {}", err.code().unwrap_or_default(), err.message());
    let mut hints = Vec::new();
    if text.contains("NotAuthorizedOrNotFound") {
        hints.push("Check that the compartment OCID is correct");
        hints.push("Check the IAM policies, e.g.:");
        hints.push("  allow any-user to manage generative-ai-family in compartment <name>");
    }
    if text.contains("InvalidParameter") {
        hints.push("Check that the model exists in your region");
    }
    hints
}

fn print_hints(err: &GatewayError) {
    let hints = hints(err);
    if hints.is_empty() {
        return;
    }
    println!("\n   💡 Possible fix:");
    for hint in hints {
        println!("   - {}", hint);
    }
}

/// Runs every check and returns whether all of them passed.
pub async fn run_checks(args: &Args) -> bool {
    let mut results: Vec<(&str, bool)> = Vec::new();

    print_header("1. COMPARTMENT");
    let compartment = args.oci_compartment_id.as_deref().filter(|id| !id.trim().is_empty());
    match compartment {
        Some(id) => print_status("OCI_COMPARTMENT_ID", true, &abbreviate(id)),
        None => print_status("OCI_COMPARTMENT_ID", false, "Not configured"),
    }
    results.push(("Compartment", compartment.is_some()));

    print_header("2. OCI CONFIG FILE");
    let config_path = expand_home(&args.oci_config_file);
    let profile = match oci::load_profile(&config_path, &args.oci_config_profile) {
        Ok(profile) => {
            print_status("Config file", true, &config_path.display().to_string());
            println!("\n   Profile: [{}]", profile.name);
            print_status("  user", true, &abbreviate(&profile.user));
            print_status("  tenancy", true, &abbreviate(&profile.tenancy));
            print_status(
                "  region",
                profile.region.is_some(),
                profile.region.as_deref().unwrap_or("Not configured")
            );
            print_status("  fingerprint", true, &profile.fingerprint);
            Some(profile)
        }
        Err(e) => {
            print_status("Config file", false, &e.to_string());
            None
        }
    };
    results.push(("OCI config", profile.is_some()));

    print_header("3. API SIGNING KEY");
    let signer = profile.as_ref().and_then(|profile| {
        match RequestSigner::from_profile(profile) {
            Ok(signer) => {
                print_status("key_file", true, &profile.key_file.display().to_string());
                Some(signer)
            }
            Err(e) => {
                print_status("key_file", false, &e.to_string());
                None
            }
        }
    });
    if profile.is_none() {
        print_status("key_file", false, "Skipped: no usable profile");
    }
    results.push(("Signing key", signer.is_some()));

    print_header("4. GENERATIVE AI");
    let live = match (compartment, signer) {
        (Some(_), Some(signer)) => probe(args, signer).await,
        _ => {
            print_status("Generative AI", false, "Skipped: fix the checks above first");
            false
        }
    };
    results.push(("Generative AI", live));

    print_header("SUMMARY");
    let all_passed = results.iter().all(|(_, ok)| *ok);
    for (name, ok) in &results {
        print_status(name, *ok, "");
    }
    if all_passed {
        println!("\n🎉 Everything is configured. Start the server without --check.");
    } else {
        println!("\n⚠️  Resolve the checks marked with ❌ before starting the server.");
    }

    all_passed
}

async fn probe(args: &Args, signer: RequestSigner) -> bool {
    let config = match AppConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            print_status("Configuration", false, &e.to_string());
            return false;
        }
    };
    println!("   Endpoint: {}", config.service_endpoint);
    println!("   Model: {}", config.text_model_id);

    let client = match
        OciChatClient::new(
            &config.service_endpoint,
            config.compartment_id.clone(),
            signer,
            config.connect_timeout,
            config.read_timeout
        )
    {
        Ok(client) => client,
        Err(e) => {
            print_status("Client", false, &e.to_string());
            return false;
        }
    };

    println!("\n   Sending test message...");
    match client.chat(&config.text_model_id, &[ChatMessage::user_text(PROBE_MESSAGE)]).await {
        Ok(reply) => {
            print_status("Response received", true, &format!("\"{}\"", reply.trim()));
            true
        }
        Err(e) => {
            print_status("Generative AI", false, "");
            println!("\n   OCI service error:");
            println!("   └─ Code: {}", e.code().unwrap_or("n/a"));
            println!("   └─ Message: {}", e.message());
            print_hints(&e);
            false
        }
    }
}
