use crate::messages::PoseStamped;
use bytes::Bytes;
use prost::Message;
use specs::Pose;
use std::time::Duration;
use zeromq::{PubSocket, Socket, SocketSend, ZmqMessage};

/// Time given to a freshly connected publisher before its first command.
///
/// Subscriptions propagate asynchronously, so anything published earlier is dropped.
const CONNECT_SETTLE: Duration = Duration::from_millis(200);
/// Time given to queued commands to leave the socket before it is dropped.
const DISCONNECT_LINGER: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("failed to connect to simulator at '{addr}': {source}")]
    Connect {
        addr: String,
        #[source]
        source: zeromq::ZmqError,
    },

    #[error("failed to send '{command}' for '{target}': {source}")]
    Send {
        command: &'static str,
        target: String,
        #[source]
        source: zeromq::ZmqError,
    },
}

/// Builds the frames of a teleport command.
pub fn teleport_frames(agent_name: &str, pose: &Pose) -> Vec<Bytes> {
    vec![
        Bytes::from_static(b"Sim"),
        Bytes::from_static(b"Teleport"),
        Bytes::copy_from_slice(agent_name.as_bytes()),
        Bytes::from(PoseStamped::now(pose).encode_to_vec()),
    ]
}

/// Connection to the simulator's command endpoint.
pub struct SimControl {
    publisher: PubSocket,
    pub_addr: String,
    sub_addr: String,
}

impl SimControl {
    /// Connects the command publisher to `pub_addr`.
    ///
    /// `sub_addr` is where the simulator publishes state; it is kept for reporting only.
    pub async fn connect(pub_addr: &str, sub_addr: &str) -> Result<Self, ControlError> {
        let mut publisher = PubSocket::new();
        publisher
            .connect(pub_addr)
            .await
            .map_err(|source| ControlError::Connect {
                addr: pub_addr.to_owned(),
                source,
            })?;
        tracing::debug!(pub_addr, sub_addr, "Connected to simulator control bus");

        tokio::time::sleep(CONNECT_SETTLE).await;

        Ok(Self {
            publisher,
            pub_addr: pub_addr.to_owned(),
            sub_addr: sub_addr.to_owned(),
        })
    }

    pub fn pub_addr(&self) -> &str {
        &self.pub_addr
    }

    pub fn sub_addr(&self) -> &str {
        &self.sub_addr
    }

    /// Moves `agent_name` to `pose` instantly. No acknowledgement is awaited.
    pub async fn teleport(&mut self, agent_name: &str, pose: &Pose) -> Result<(), ControlError> {
        self.send("Teleport", agent_name, teleport_frames(agent_name, pose))
            .await
    }

    async fn send(
        &mut self,
        command: &'static str,
        target: &str,
        frames: Vec<Bytes>,
    ) -> Result<(), ControlError> {
        let mut frames = frames.into_iter();
        let mut message = match frames.next() {
            Some(first) => ZmqMessage::from(first),
            None => return Ok(()),
        };
        for frame in frames {
            message.push_back(frame);
        }

        self.publisher
            .send(message)
            .await
            .map_err(|source| ControlError::Send {
                command,
                target: target.to_owned(),
                source,
            })?;
        tracing::debug!(command, target, "Sent simulator command");
        Ok(())
    }

    /// Gives pending commands a moment to flush, then closes the connection.
    pub async fn disconnect(self) {
        tokio::time::sleep(DISCONNECT_LINGER).await;
        drop(self.publisher);
    }
}
