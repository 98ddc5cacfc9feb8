//! TOPIC handler.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use crate::state::user_prefix;
use anonirc_proto::{Command, Message, Response};
use async_trait::async_trait;

/// Handler for TOPIC command.
///
/// `TOPIC #chan` queries, `TOPIC #chan :text` sets, `TOPIC #chan :` clears.
pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::TOPIC(channel, text) = &msg.command else {
            return Ok(());
        };

        match text {
            None => {
                let (display, topic) = ctx.matrix.topic(channel)?;
                match topic {
                    Some(topic) => {
                        ctx.send_reply(Response::RPL_TOPIC, vec![display, topic.text])
                            .await
                    }
                    None => {
                        ctx.send_reply(
                            Response::RPL_NOTOPIC,
                            vec![display, "No topic is set".to_string()],
                        )
                        .await
                    }
                }
            }
            Some(text) => {
                ctx.matrix.set_topic(ctx.session, channel, text)?;
                let (display, _) = ctx.matrix.topic(channel)?;
                ctx.send(Message::new(
                    Some(user_prefix(&ctx.nick())),
                    Command::TOPIC(display, Some(text.clone())),
                ))
                .await
            }
        }
    }
}
