use serde::Serialize;

/// Notification queued by a [`GameSession`](crate::GameSession) for its front end.
///
/// Events are collected in order and handed out by
/// [`GameSession::drain_events`](crate::GameSession::drain_events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Score, line or level counters changed.
    ScoreUpdate {
        lines: usize,
        score: usize,
        level: usize,
    },
    /// Clear-type text to display. An empty text replaces the previous message.
    Message { text: String },
    /// The session ended. Sent at most once.
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let update = GameEvent::ScoreUpdate {
            lines: 4,
            score: 1600,
            level: 0,
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"type":"score_update","lines":4,"score":1600,"level":0}"#
        );
        assert_eq!(
            serde_json::to_string(&GameEvent::GameOver).unwrap(),
            r#"{"type":"game_over"}"#
        );
    }
}
