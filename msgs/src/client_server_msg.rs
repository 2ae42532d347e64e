use anyhow::{bail, Context};
use serde_json::Value;

use crate::change::Change;

/// Messages sent from a player's connection to the game server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientServerMsg {
    NewGame,
    Join (String),
    Begin,
    /// `None` when the payload was not a well-formed change.
    Action (Option<Change>),
    DisplayName (String),
    Restart,
}

impl ClientServerMsg {
    /// Decodes a `[type, payload]` text frame.
    pub fn decode(text: &str) -> anyhow::Result<ClientServerMsg> {
        let (msg_type, payload) = serde_json::from_str::<(String, Value)>(text)
            .context("envelope is not a [type, payload] pair")?;

        let msg = match msg_type.as_str() {
            "new game" => ClientServerMsg::NewGame,
            "join" => {
                let code = serde_json::from_value(payload).context("join code must be a string")?;
                ClientServerMsg::Join (code)
            }
            "begin" => ClientServerMsg::Begin,
            "action" => ClientServerMsg::Action (Change::from_payload(payload)),
            "display name" => {
                let name: String = serde_json::from_value(payload).context("display name must be a string")?;
                if name.is_empty() {
                    bail!("display name must not be empty");
                }
                ClientServerMsg::DisplayName (name)
            }
            "restart" => ClientServerMsg::Restart,
            msg_type => {
                bail!("unsupported msg type: {msg_type}");
            }
        };

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn decodes_client_messages() {
        assert_eq!(ClientServerMsg::decode(r#"["new game",null]"#).unwrap(), ClientServerMsg::NewGame);
        assert_eq!(ClientServerMsg::decode(r#"["join","example-code"]"#).unwrap(), ClientServerMsg::Join("example-code".into()));
        assert_eq!(ClientServerMsg::decode(r#"["begin",null]"#).unwrap(), ClientServerMsg::Begin);
        assert_eq!(
            ClientServerMsg::decode(r#"["action",[1,true]]"#).unwrap(),
            ClientServerMsg::Action(Some(Change::direction(Color::Green, true)))
        );
        assert_eq!(ClientServerMsg::decode(r#"["display name","Bob"]"#).unwrap(), ClientServerMsg::DisplayName("Bob".into()));
    }

    #[test]
    fn invalid_action_payload_is_still_an_action() {
        assert_eq!(ClientServerMsg::decode(r#"["action","invalid"]"#).unwrap(), ClientServerMsg::Action(None));
    }

    #[test]
    fn malformed_envelopes_are_errors() {
        for text in [
            "not json",
            r#"{"type":"join"}"#,
            r#"["join"]"#,
            r#"["join","code","extra"]"#,
            r#"[3,null]"#,
            r#"["join",5]"#,
            r#"["display name",""]"#,
            r#"["launch missiles",null]"#,
        ] {
            assert!(ClientServerMsg::decode(text).is_err(), "{text}");
        }
    }
}
