//! Registration completion.
//!
//! Once both NICK and USER have been seen the address is checked against
//! the ban store again (a D-line may have landed since accept), then the
//! welcome burst goes out: 001-004, the MOTD, and the lobby join.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::Context;
use crate::handlers::channel::send_join_burst;
use crate::handlers::server_query::send_motd;
use crate::state::SessionState;
use anonirc_proto::Response;
use anonirc_proto::chan::LOBBY;
use tracing::{error, info, warn};

const VERSION: &str = concat!("anonircd-", env!("CARGO_PKG_VERSION"));

/// Complete registration if NICK and USER are both in.
pub async fn try_register(ctx: &mut Context<'_>) -> HandlerResult {
    let ready = {
        let data = ctx.session.data();
        data.state == SessionState::Registering && data.nick.is_some() && data.user.is_some()
    };
    if !ready {
        return Ok(());
    }

    check_ban(ctx).await?;
    send_welcome(ctx).await?;
    send_motd(ctx).await?;

    if let Some(outcome) = ctx.matrix.join(ctx.session, LOBBY)? {
        send_join_burst(ctx, &outcome).await?;
    }
    ctx.session.set_state(SessionState::Active);
    info!(session = %ctx.session.id, addr = %ctx.remote_addr, "Client registered");
    Ok(())
}

async fn check_ban(ctx: &Context<'_>) -> HandlerResult {
    match ctx.matrix.bans.is_banned(ctx.remote_addr.ip()).await {
        Ok(None) => Ok(()),
        Ok(Some(ban)) => {
            info!(addr = %ctx.remote_addr, mask = %ban.mask, "Banned client refused at registration");
            Err(HandlerError::Banned(ban.reason().to_string()))
        }
        Err(e) if ctx.config.bans.fail_open => {
            warn!(error = %e, "Ban store unavailable, admitting client");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Ban store unavailable, refusing client");
            Err(HandlerError::Banned("Ban check unavailable".to_string()))
        }
    }
}

async fn send_welcome(ctx: &Context<'_>) -> HandlerResult {
    let server = ctx.config.server.name.clone();
    let network = ctx.config.server.network.clone();
    let nick = ctx.nick();
    let created = ctx.matrix.started_at.format("%Y-%m-%d %H:%M:%S UTC");

    ctx.send_reply(
        Response::RPL_WELCOME,
        vec![format!("Welcome to the {network} IRC Network, {nick}")],
    )
    .await?;
    ctx.send_reply(
        Response::RPL_YOURHOST,
        vec![format!("Your host is {server}, running version {VERSION}")],
    )
    .await?;
    ctx.send_reply(
        Response::RPL_CREATED,
        vec![format!("This server was created {created}")],
    )
    .await?;
    ctx.send_reply(
        Response::RPL_MYINFO,
        vec![server, VERSION.to_string(), "o".to_string(), "t".to_string()],
    )
    .await
}
