//! Redis pub/sub bridge for cross-instance fanout. Each instance runs one
//! pattern subscriber that replays remote publishes into its local
//! registry; channel names mirror the in-process `Channel` keys.

use crate::websocket::{Channel, ConnectionRegistry};
use redis::AsyncCommands;
use redis::Client;
use uuid::Uuid;

fn channel_name(channel: Channel) -> String {
    match channel {
        Channel::Room(id) => format!("chat:room:{id}"),
        Channel::User(id) => format!("chat:user:{id}"),
    }
}

fn parse_channel(name: &str) -> Option<Channel> {
    if let Some(id) = name.strip_prefix("chat:room:") {
        return Uuid::parse_str(id).ok().map(Channel::Room);
    }
    if let Some(id) = name.strip_prefix("chat:user:") {
        return Uuid::parse_str(id).ok().map(Channel::User);
    }
    None
}

pub async fn publish(client: &Client, channel: Channel, payload: &str) -> redis::RedisResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    conn.publish::<_, _, ()>(channel_name(channel), payload)
        .await
}

pub async fn start_psub_listener(
    client: Client,
    registry: ConnectionRegistry,
) -> redis::RedisResult<()> {
    // PubSub requires a dedicated connection, not multiplexed
    let conn = client.get_async_connection().await?;
    let mut pubsub = conn.into_pubsub();
    pubsub.psubscribe("chat:*").await?;
    let mut stream = pubsub.on_message();
    use futures_util::StreamExt;
    while let Some(msg) = stream.next().await {
        let name: String = msg.get_channel_name().into();
        let payload: String = msg.get_payload()?;
        match parse_channel(&name) {
            Some(channel) => registry.broadcast(channel, payload).await,
            None => tracing::warn!(channel = %name, "unroutable pub/sub channel"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_round_trip() {
        let room = Channel::Room(Uuid::new_v4());
        let user = Channel::User(Uuid::new_v4());

        assert_eq!(parse_channel(&channel_name(room)), Some(room));
        assert_eq!(parse_channel(&channel_name(user)), Some(user));
    }

    #[test]
    fn foreign_channels_are_rejected() {
        assert_eq!(parse_channel("chat:room:not-a-uuid"), None);
        assert_eq!(parse_channel("presence:whatever"), None);
    }
}
