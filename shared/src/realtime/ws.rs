//! Display WebSocket protocol
//!
//! Server → Display: ServerMessage (snapshot, pong, ticket/timer/menu events)
//! Display → Server: ClientCommand (join rooms, clock-sync ping)
//!
//! Every ticket event carries the full ticket so a display can merge by id
//! without a follow-up fetch. Displays must tolerate receiving a ticket they
//! already hold from their snapshot.

use serde::{Deserialize, Serialize};

use crate::models::{Room, Ticket, TimerEnded, TimerStarted};

/// Server → Display 推送消息
///
/// Wire shape: `{"event": "<snake_case name>", "data": { ... }}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Private reply to `join`
    Snapshot(Snapshot),
    /// Private reply to `ping`
    Pong(Pong),
    TicketCreated(Ticket),
    TimerStarted(TimerStarted),
    TicketCompleted(Ticket),
    /// Last-known fields of a deleted ticket
    TicketCancelled(Ticket),
    /// Non-state change (priority toggle)
    TicketUpdated(Ticket),
    TimerEnded(TimerEnded),
    MenuUpdated(MenuUpdated),
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::Snapshot(_) => "snapshot",
            ServerMessage::Pong(_) => "pong",
            ServerMessage::TicketCreated(_) => "ticket_created",
            ServerMessage::TimerStarted(_) => "timer_started",
            ServerMessage::TicketCompleted(_) => "ticket_completed",
            ServerMessage::TicketCancelled(_) => "ticket_cancelled",
            ServerMessage::TicketUpdated(_) => "ticket_updated",
            ServerMessage::TimerEnded(_) => "timer_ended",
            ServerMessage::MenuUpdated(_) => "menu_updated",
        }
    }
}

/// Display → Server 命令
///
/// Wire shape: `{"event": "join", "rooms": ["fryer"]}`, `{"event": "ping"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Replace this connection's room set. Unknown names are dropped.
    Join { rooms: Vec<String> },
    Ping {
        #[serde(default, rename = "clientSentMs", skip_serializing_if = "Option::is_none")]
        client_sent_ms: Option<i64>,
    },
}

/// Point-in-time view for a freshly joined connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Rooms the connection ended up in after validation
    pub rooms: Vec<Room>,
    /// Non-completed tickets, most recent first
    pub tickets: Vec<Ticket>,
    /// Recently completed tickets; only populated for source rooms
    #[serde(default)]
    pub completed_tickets: Vec<Ticket>,
    pub menu_version: i64,
    /// Basis for the display's clock-offset estimate
    pub server_now_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pong {
    pub server_now_ms: i64,
    /// Echo of the ping's timestamp, if the display sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_sent_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuUpdated {
    pub version: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_started_wire_shape() {
        let msg = ServerMessage::TimerStarted(TimerStarted {
            ticket_id: 9,
            started_at: 1000,
            duration_seconds: 480,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "timer_started");
        assert_eq!(value["data"]["ticketId"], 9);
        assert_eq!(value["data"]["startedAt"], 1000);
        assert_eq!(value["data"]["durationSeconds"], 480);
        assert_eq!(msg.event_name(), "timer_started");
    }

    #[test]
    fn join_keeps_raw_room_names() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"join","rooms":["fryer","patio"]}"#).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Join {
                rooms: vec!["fryer".into(), "patio".into()]
            }
        );
    }

    #[test]
    fn ping_without_timestamp() {
        let cmd: ClientCommand = serde_json::from_str(r#"{"event":"ping"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Ping { client_sent_ms: None });
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"ping","clientSentMs":42}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Ping { client_sent_ms: Some(42) });
    }
}
