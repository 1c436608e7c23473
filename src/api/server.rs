use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use anyhow::{Context, Result};
use tracing::{error, info, warn};
use crate::api::dto::{CommandReq, ResponseDto};
use crate::application::GraphController;

/// Shared controller. Every request holds the lock from mutation to finished
/// markup, so renders never observe a half-applied expansion state.
pub type SharedController = Arc<Mutex<GraphController>>;

pub fn start_server(port: u16, controller: SharedController) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;
    serve(listener, controller)
}

/// Accept connections on an already bound listener, one thread each.
pub fn serve(listener: TcpListener, controller: SharedController) -> Result<()> {
    info!(address = %listener.local_addr()?, "CallScope server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let controller = Arc::clone(&controller);
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &controller) {
                        warn!(error = %e, "connection error");
                    }
                });
            }
            Err(e) => error!(error = %e, "accept error"),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, controller: &SharedController) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // Connection closed
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match process_command(trimmed, controller) {
            Ok(response) => response,
            Err(e) => ResponseDto::alert(format!("{:#}", e)),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;
    }
    Ok(())
}

fn process_command(json_str: &str, controller: &SharedController) -> Result<ResponseDto> {
    let req: CommandReq = serde_json::from_str(json_str)
        .context("Invalid JSON format")?;

    let Some(request) = req.to_request()? else {
        return Ok(ResponseDto::pong());
    };

    let mut controller = controller
        .lock()
        .map_err(|_| anyhow::anyhow!("Controller state is poisoned"))?;
    Ok(controller.handle(request).into())
}
