//! Method channel listener

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::config::StartupConfig;
use crate::error::{BridgeError, ChannelError};
use crate::error::handlers::error_to_channel_code;
use crate::protocol::{BridgeContext, MethodReply, handle_call};

pub struct Server {
    listener: TcpListener,
    context: Arc<BridgeContext>,
    max_request_length: usize,
}

impl Server {
    pub async fn bind(startup: &StartupConfig, context: BridgeContext) -> Result<Self, BridgeError> {
        let socket = startup.channel_socket();
        let listener = TcpListener::bind(&socket).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            BridgeError::from(e)
        })?;
        info!("Method channel bound to {}", socket);

        Ok(Self {
            listener,
            context: Arc::new(context),
            max_request_length: startup.max_request_length,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!("Storage bridge serving calls");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let context = Arc::clone(&self.context);
                    let max_request_length = self.max_request_length;

                    // One task per caller so a slow copy never blocks accept
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, addr, context, max_request_length).await
                        {
                            warn!("Connection {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Serves one caller: a call per line in, a reply per line out.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    context: Arc<BridgeContext>,
    max_request_length: usize,
) -> Result<(), std::io::Error> {
    info!("Caller connected: {}", addr);

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        // Never buffer more than one byte past the limit
        let n = (&mut reader)
            .take(max_request_length as u64 + 1)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            info!("Connection closed by caller {}", addr);
            return Ok(());
        }

        let reply = if line.len() > max_request_length {
            let mut total = line.len();
            if line.last() != Some(&b'\n') {
                total += discard_line(&mut reader).await?;
            }
            reject(addr, ChannelError::RequestTooLong(total))
        } else {
            match std::str::from_utf8(&line) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => handle_call(text, &context).await,
                Err(_) => reject(addr, ChannelError::MalformedCall("invalid UTF-8".into())),
            }
        };

        write_half.write_all(reply.to_line().as_bytes()).await?;
        write_half.flush().await?;
    }
}

fn reject(addr: SocketAddr, error: ChannelError) -> MethodReply {
    let err = BridgeError::from(error);
    warn!("Rejected call from {}: {}", addr, err);
    MethodReply::Error {
        code: error_to_channel_code(&err).to_string(),
        message: err.to_string(),
    }
}

/// Skips the rest of an oversized line, returning how many bytes were dropped.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<usize> {
    let mut discarded = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(discarded);
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(discarded + end + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                discarded += len;
            }
        }
    }
}
