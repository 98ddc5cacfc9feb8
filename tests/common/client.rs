//! Test IRC client.
//!
//! Provides an IRC client for integration testing that can send commands
//! and assert on received responses.

use anonirc_proto::{Command, Message, Response};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test IRC client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    nick: String,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            nick: nick.to_string(),
        })
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Send a raw IRC line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send an IRC command.
    pub async fn send(&mut self, cmd: Command) -> anyhow::Result<()> {
        let msg = Message::from(cmd);
        self.send_raw(&msg.to_string()).await
    }

    /// Receive a single raw line, terminator stripped. `None` on EOF.
    pub async fn recv_line(&mut self) -> anyhow::Result<Option<String>> {
        self.recv_line_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Receive a single message from the server.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a message with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let Some(line) = self.recv_line_timeout(dur).await? else {
            anyhow::bail!("connection closed");
        };
        line.parse::<Message>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Receive messages until the predicate matches; returns all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Message>>
    where
        F: FnMut(&Message) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                break;
            }
        }
        Ok(messages)
    }

    /// Receive until the given numeric arrives.
    pub async fn recv_until_numeric(&mut self, response: Response) -> anyhow::Result<Vec<Message>> {
        self.recv_until(|msg| is_numeric(msg, response)).await
    }

    /// Read lines until the server closes the socket; returns them raw.
    pub async fn recv_until_closed(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.recv_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }

    /// True if nothing arrives within `dur`.
    pub async fn is_quiet(&mut self, dur: Duration) -> bool {
        self.recv_line_timeout(dur).await.is_err()
    }

    /// Register with the server (NICK + USER) and consume the welcome
    /// burst through the end of the lobby NAMES list.
    pub async fn register(&mut self) -> anyhow::Result<Vec<Message>> {
        self.send(Command::NICK(self.nick.clone())).await?;
        self.send(Command::USER(
            self.nick.clone(),
            "0".to_string(),
            format!("Test User {}", self.nick),
        ))
        .await?;

        let messages = self.recv_until_numeric(Response::RPL_ENDOFNAMES).await?;
        if !messages.iter().any(|m| is_numeric(m, Response::RPL_WELCOME)) {
            anyhow::bail!("Registration failed: no RPL_WELCOME received")
        }
        Ok(messages)
    }

    /// Join a channel and consume the join burst through RPL_ENDOFNAMES.
    pub async fn join(&mut self, channel: &str) -> anyhow::Result<Vec<Message>> {
        self.send(Command::JOIN(channel.to_string(), None)).await?;
        self.recv_until_numeric(Response::RPL_ENDOFNAMES).await
    }

    /// Send a PRIVMSG.
    pub async fn privmsg(&mut self, target: &str, text: &str) -> anyhow::Result<()> {
        self.send(Command::PRIVMSG(target.to_string(), text.to_string()))
            .await
    }

    /// Send QUIT.
    pub async fn quit(&mut self, reason: Option<String>) -> anyhow::Result<()> {
        self.send(Command::QUIT(reason)).await
    }
}

/// True if `msg` is the numeric `response`.
pub fn is_numeric(msg: &Message, response: Response) -> bool {
    matches!(&msg.command, Command::Response(resp, _) if *resp == response)
}

/// The label in a `label!Anon@IRC` prefix.
#[allow(dead_code)]
pub fn source_name(msg: &Message) -> Option<&str> {
    msg.prefix.as_ref().map(|p| p.name())
}
