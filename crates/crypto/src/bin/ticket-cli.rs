//! Ticket CLI Tool
//!
//! Command-line interface for issuing and verifying ticket tokens outside
//! the gate service, e.g. for box-office reprints or offline door checks.
//! The secret is read from `TURNSTILE_TOKEN_SECRET`.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process;
use turnstile_core::config::DEFAULT_SECRET_ENV;
use turnstile_crypto::{
    generate_ticket_number, TicketClaims, TicketIdentity, TicketTokenCodec, TokenSecret,
};

/// JSON output for issue command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueOutput {
    token: String,
    ticket_number: String,
    success: bool,
}

/// JSON output for verify command
#[derive(Debug, Serialize)]
struct VerifyOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ticket: Option<TicketClaims>,
    message: String,
}

#[derive(Debug, Default)]
struct IssueArgs {
    registration_id: Option<String>,
    event_id: Option<String>,
    user_id: Option<String>,
    ticket_number: Option<String>,
    quantity: Option<u32>,
    json: bool,
}

fn load_codec() -> TicketTokenCodec {
    let secret = TokenSecret::from_env(DEFAULT_SECRET_ENV);
    if secret.is_fallback() {
        eprintln!(
            "Warning: {} is not set, using the insecure development secret",
            DEFAULT_SECRET_ENV
        );
    }
    TicketTokenCodec::new(secret)
}

fn cmd_issue(args: IssueArgs) -> Result<(), String> {
    let registration_id = args
        .registration_id
        .ok_or("Missing --registration argument")?;
    let event_id = args.event_id.ok_or("Missing --event argument")?;
    let user_id = args.user_id.ok_or("Missing --user argument")?;
    let ticket_number = args.ticket_number.unwrap_or_else(generate_ticket_number);

    let identity = TicketIdentity {
        registration_id,
        event_id,
        user_id,
        ticket_number,
        quantity: args.quantity.unwrap_or(1),
    };

    let codec = load_codec();
    let token = codec
        .issue(&identity)
        .map_err(|e| format!("Failed to issue token: {}", e))?;

    if args.json {
        let output = IssueOutput {
            token,
            ticket_number: identity.ticket_number,
            success: true,
        };
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize output: {}", e))?;
        println!("{}", text);
    } else {
        println!("Ticket number: {}", identity.ticket_number);
        println!("{}", token);
    }

    Ok(())
}

fn cmd_verify(token: String, json: bool) -> Result<(), String> {
    let codec = load_codec();
    let result = codec.inspect(token.trim());

    let (output, outcome) = match result {
        Ok(claims) => (
            VerifyOutput {
                valid: true,
                ticket: Some(claims),
                message: "Token is valid".to_string(),
            },
            Ok(()),
        ),
        Err(e) => (
            VerifyOutput {
                valid: false,
                ticket: None,
                message: e.to_string(),
            },
            Err("Token verification failed".to_string()),
        ),
    };

    if json {
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize output: {}", e))?;
        println!("{}", text);
    } else if let Some(ticket) = &output.ticket {
        println!("✓ Token is VALID");
        println!("  Registration: {}", ticket.registration_id);
        println!("  Event:        {}", ticket.event_id);
        println!("  Holder:       {}", ticket.user_id);
        println!("  Ticket:       {}", ticket.ticket_number);
        println!("  Quantity:     {}", ticket.quantity);
        println!("  Issued at:    {}", ticket.timestamp);
    } else {
        println!("✗ Token is INVALID: {}", output.message);
    }

    outcome
}

fn parse_args() -> Result<(String, Vec<String>), String> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        return Err("Usage: ticket-cli <command> [options]".to_string());
    }

    Ok((args[1].clone(), args[2..].to_vec()))
}

fn print_usage() {
    println!("Ticket CLI - Issue and verify ticket tokens");
    println!();
    println!("USAGE:");
    println!("    ticket-cli issue --registration <id> --event <id> --user <id> [--ticket-number <n>] [--quantity <n>] [--json]");
    println!("    ticket-cli verify (--token <text> | --input <file>) [--json]");
    println!();
    println!("COMMANDS:");
    println!("    issue     Issue a signed token for a registration");
    println!("    verify    Verify a token and print the ticket it carries");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}    Shared token secret", DEFAULT_SECRET_ENV);
    println!();
    println!("EXAMPLES:");
    println!("    ticket-cli issue --registration r1 --event e1 --user u1 --quantity 2");
    println!("    ticket-cli verify --input scanned.txt --json");
}

fn main() {
    let (command, args) = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            println!();
            print_usage();
            process::exit(1);
        }
    };

    let result = match command.as_str() {
        "issue" => {
            let mut issue_args = IssueArgs::default();
            let mut bad_quantity = None;

            let mut i = 0;
            while i < args.len() {
                let flag = args[i].as_str();
                let value = args.get(i + 1).cloned();
                match flag {
                    "--registration" | "-r" => {
                        issue_args.registration_id = value;
                        i += 1;
                    }
                    "--event" | "-e" => {
                        issue_args.event_id = value;
                        i += 1;
                    }
                    "--user" | "-u" => {
                        issue_args.user_id = value;
                        i += 1;
                    }
                    "--ticket-number" | "-t" => {
                        issue_args.ticket_number = value;
                        i += 1;
                    }
                    "--quantity" | "-q" => {
                        let parsed = value.as_deref().map(str::parse::<u32>);
                        match parsed {
                            Some(Ok(quantity)) => issue_args.quantity = Some(quantity),
                            _ => bad_quantity = Some(value.unwrap_or_default()),
                        }
                        i += 1;
                    }
                    "--json" => issue_args.json = true,
                    _ => {}
                }
                i += 1;
            }

            match bad_quantity {
                Some(raw) => Err(format!("Invalid --quantity value: '{}'", raw)),
                None => cmd_issue(issue_args),
            }
        }
        "verify" => {
            let mut token = None;
            let mut input = None;
            let mut json = false;

            let mut i = 0;
            while i < args.len() {
                match args[i].as_str() {
                    "--token" => {
                        i += 1;
                        if i < args.len() {
                            token = Some(args[i].clone());
                        }
                    }
                    "--input" | "-i" => {
                        i += 1;
                        if i < args.len() {
                            input = Some(PathBuf::from(&args[i]));
                        }
                    }
                    "--json" => json = true,
                    _ => {}
                }
                i += 1;
            }

            match (token, input) {
                (Some(token), None) => cmd_verify(token, json),
                (None, Some(path)) => fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
                    .and_then(|token| cmd_verify(token, json)),
                (Some(_), Some(_)) => Err("Use either --token or --input, not both".to_string()),
                (None, None) => Err("Missing --token or --input argument".to_string()),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            print_usage();
            Err(format!("Unknown command: {}", command))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
