//! Dashboard server.
//!
//! Serves the generated page and the loaded results as JSON for other
//! tooling. Single-threaded by design: the bundle is loaded once and
//! immutable for the process lifetime, and every request is an independent
//! render from it. Run with: cargo run --bin serve
//!
//! Endpoints:
//!   GET /            - the dashboard page
//!   GET /api/bundle  - loaded result bundle as JSON
//!   GET /api/impact  - recomputed estimate; query: adoption_rate,
//!                      monetization_rate, cpm, period (daily|monthly)
//!   GET /api/health  - health check

use std::env;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};

use anyhow::Result;

use liftboard::impact::{project, Assumptions, Period};
use liftboard::page::render_page;
use liftboard::session::RenderContext;
use liftboard::source::{FileSource, LoadedResults, ResultSource, SyntheticSource};

fn parse_arg(args: &[String], flag: &str, default: &str) -> String {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Parse the query string of a request target into key/value pairs. No
/// percent-decoding: the accepted values are plain numbers and keywords.
fn query_pairs(target: &str) -> Vec<(String, String)> {
    match target.split_once('?') {
        Some((_, query)) => query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => Vec::new(),
    }
}

/// Build assumptions from query parameters, defaulting each absent one.
/// A present-but-unparseable value is a caller error.
fn assumptions_from_query(pairs: &[(String, String)]) -> Result<Assumptions, String> {
    let mut a = Assumptions::default();
    for (key, value) in pairs {
        let slot = match key.as_str() {
            "adoption_rate" => &mut a.adoption_rate,
            "monetization_rate" => &mut a.monetization_rate,
            "cpm" => &mut a.cpm,
            "period" => continue,
            _ => return Err(format!("unknown parameter {}", key)),
        };
        *slot = value
            .parse::<f64>()
            .map_err(|_| format!("parameter {} is not a number: {:?}", key, value))?;
    }
    Ok(a)
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: {}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Content-Length: {}\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn json_error(stream: &mut TcpStream, status: &str, message: &str) {
    let body = serde_json::json!({ "error": message }).to_string();
    respond(stream, status, "application/json", &body);
}

fn handle(stream: &mut TcpStream, target: &str, loaded: &LoadedResults) {
    if target == "/" || target.starts_with("/index") {
        match render_page(loaded, &RenderContext::default()) {
            Ok(page) => respond(stream, "200 OK", "text/html; charset=utf-8", &page),
            Err(e) => json_error(stream, "500 Internal Server Error", &e.to_string()),
        }
    } else if target.starts_with("/api/bundle") {
        match serde_json::to_string(&loaded.bundle) {
            Ok(body) => respond(stream, "200 OK", "application/json", &body),
            Err(e) => json_error(stream, "500 Internal Server Error", &e.to_string()),
        }
    } else if target.starts_with("/api/impact") {
        let pairs = query_pairs(target);
        let assumptions = match assumptions_from_query(&pairs) {
            Ok(a) => a,
            Err(msg) => return json_error(stream, "400 Bad Request", &msg),
        };
        let period = match pairs.iter().find(|(k, _)| k == "period") {
            Some((_, v)) => match Period::from_str(v) {
                Some(p) => p,
                None => {
                    return json_error(
                        stream,
                        "400 Bad Request",
                        &format!("period must be daily or monthly, got {:?}", v),
                    )
                }
            },
            None => Period::Monthly,
        };
        // Domain violations surface to the caller instead of being clamped.
        match project(&loaded.bundle.business_impact, period, &assumptions) {
            Ok(estimate) => {
                let body = serde_json::to_string(&estimate).unwrap_or_default();
                respond(stream, "200 OK", "application/json", &body);
            }
            Err(e) => json_error(stream, "400 Bad Request", &e.to_string()),
        }
    } else if target.starts_with("/api/health") {
        respond(stream, "200 OK", "application/json", r#"{"status":"ok"}"#);
    } else {
        respond(stream, "404 Not Found", "text/plain", "Not Found");
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let results_dir = parse_arg(&args, "--results", "results");
    let port: u16 = parse_arg(&args, "--port", "8765").parse()?;
    let synthetic = args.iter().any(|a| a == "--synthetic");

    let loaded = if synthetic {
        SyntheticSource.load()?
    } else {
        FileSource::new(&results_dir).load()?
    };

    let listener = TcpListener::bind(("127.0.0.1", port))?;
    println!("Dashboard server running at http://localhost:{}", port);
    println!();
    println!("Endpoints:");
    println!("  GET /            - dashboard page");
    println!("  GET /api/bundle  - loaded result bundle");
    println!("  GET /api/impact  - recomputed estimate from query parameters");
    println!("  GET /api/health  - health check");

    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(s) => s,
            Err(_) => continue,
        };

        let request_line = {
            let buf_reader = BufReader::new(&stream);
            buf_reader.lines().next()
        };
        let request = match request_line {
            Some(Ok(line)) => line,
            _ => continue,
        };

        // "GET /path HTTP/1.1" -> "/path"
        let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
        if !request.starts_with("GET ") {
            json_error(&mut stream, "405 Method Not Allowed", "only GET is supported");
            continue;
        }
        log::debug!("GET {}", target);
        handle(&mut stream, &target, &loaded);
    }
    Ok(())
}
