//! Connection and room registry for the realtime gateway.
//!
//! Owned by `AppState` and shared with every session actor; holds the only
//! mapping from live connections to actor mailboxes and from games to the
//! connections currently viewing them.

use actix::prelude::*;
use dashmap::DashMap;
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

/// Envelope delivered to a session actor for transmission to its client.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Outbound(pub ServerMsg);

#[derive(Default)]
pub struct WsRegistry {
    connections: DashMap<Uuid, Recipient<Outbound>>,
    rooms: DashMap<i64, DashMap<Uuid, Recipient<Outbound>>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connection(&self, conn_id: Uuid, recipient: Recipient<Outbound>) {
        self.connections.insert(conn_id, recipient);
    }

    /// Drop the connection and prune it from every room it joined.
    pub fn unregister_connection(&self, conn_id: Uuid) {
        self.connections.remove(&conn_id);
        self.rooms.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
    }

    /// Add the connection to a game's room. A connection unknown to the
    /// registry is ignored.
    pub fn join_room(&self, game_id: i64, conn_id: Uuid) {
        if let Some(recipient) = self.connections.get(&conn_id) {
            self.rooms
                .entry(game_id)
                .or_default()
                .insert(conn_id, recipient.value().clone());
        }
    }

    /// Remove the connection from a game's room; the room entry is discarded
    /// once empty. Leaving twice is fine.
    pub fn leave_room(&self, game_id: i64, conn_id: Uuid) {
        if let Some(members) = self.rooms.get(&game_id) {
            members.remove(&conn_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove_if(&game_id, |_, members| members.is_empty());
            }
        }
    }

    /// Deliver to every member of a game's room, in registry order.
    pub fn broadcast(&self, game_id: i64, msg: ServerMsg) {
        if let Some(members) = self.rooms.get(&game_id) {
            for member in members.iter() {
                member.value().do_send(Outbound(msg.clone()));
            }
        }
    }

    /// Deliver to every room member except one connection (typically the
    /// sender of the event being relayed).
    pub fn broadcast_except(&self, game_id: i64, except: Uuid, msg: ServerMsg) {
        if let Some(members) = self.rooms.get(&game_id) {
            for member in members.iter() {
                if *member.key() != except {
                    member.value().do_send(Outbound(msg.clone()));
                }
            }
        }
    }

    /// Deliver directly to one connection, whether or not it is in a room.
    pub fn send_to(&self, conn_id: Uuid, msg: ServerMsg) {
        if let Some(recipient) = self.connections.get(&conn_id) {
            recipient.value().do_send(Outbound(msg));
        }
    }

    pub fn room_size(&self, game_id: i64) -> usize {
        self.rooms.get(&game_id).map_or(0, |members| members.len())
    }
}
