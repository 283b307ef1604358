//! The stdin/stdout protocol loop.

use crate::presenter::TerminalPresenter;
use crate::PinentryArgs;
use keypin_core::command::{parse_line, Command};
use keypin_core::config::Config;
use keypin_core::{Dispatcher, HostInfo};
use keypin_secrets::{gate_for, Cache};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// First line written to the agent.
pub const GREETING: &str = "OK Pleased to meet you";

/// Serve the protocol on stdin/stdout until BYE or end of input.
pub async fn run(config: &Config, args: &PinentryArgs) -> anyhow::Result<()> {
    let cache: Arc<dyn keypin_core::CredentialCache> = match Cache::open(&config.cache) {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!("credential cache unavailable, prompting every time: {e}");
            Arc::new(Cache::Disabled)
        }
    };
    let biometrics = gate_for(config.biometrics.mode);
    let presenter = Arc::new(TerminalPresenter::spawn()?);

    let mut dispatcher = Dispatcher::new(presenter, cache, biometrics)
        .with_host_info(host_info(args))
        .with_default_timeout(args.timeout.unwrap_or(0));
    if let Some(reason) = &config.biometrics.reason {
        dispatcher = dispatcher.with_biometric_reason(reason.clone());
    }

    info!(pid = std::process::id(), "serving protocol on stdin");
    let stdin = BufReader::new(tokio::io::stdin());
    serve(&mut dispatcher, stdin, tokio::io::stdout()).await?;
    info!("session ended");
    Ok(())
}

fn host_info(args: &PinentryArgs) -> HostInfo {
    let mut host = HostInfo::from_env();
    if let Some(tty) = &args.ttyname {
        host = host.with_tty_name(tty.clone());
    }
    if let Some(tty_type) = &args.ttytype {
        host = host.with_tty_type(tty_type.clone());
    }
    if let Some(display) = &args.display {
        host = host.with_display(display.clone());
    }
    host
}

/// Greet, then answer every request line until BYE or end of input.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the
/// session.
pub async fn serve<R, W>(dispatcher: &mut Dispatcher, mut input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_response(&mut output, GREETING).await?;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if std::str::from_utf8(&buf).is_err() {
            warn!("request line is not valid UTF-8, replacing invalid bytes");
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\r', '\n']);

        let Some(response) = dispatcher.handle(line).await else {
            continue;
        };
        write_response(&mut output, &response).await?;

        if is_bye(line) {
            debug!("BYE received");
            break;
        }
    }
    Ok(())
}

fn is_bye(line: &str) -> bool {
    parse_line(line).is_some_and(|request| request.command == Command::Bye)
}

async fn write_response<W: AsyncWrite + Unpin>(output: &mut W, response: &str) -> std::io::Result<()> {
    output.write_all(response.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypin_core::testing::{FakePresenter, FixedGate, MemoryCache};
    use keypin_core::{Credential, InputOutcome};

    fn dispatcher(presenter: FakePresenter) -> Dispatcher {
        Dispatcher::new(
            Arc::new(presenter),
            Arc::new(MemoryCache::new()),
            Arc::new(FixedGate::deny()),
        )
        .with_host_info(HostInfo::default().with_tty_name("/dev/pts/1"))
    }

    async fn transcript(dispatcher: &mut Dispatcher, input: &str) -> String {
        let mut output = Vec::new();
        serve(dispatcher, input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_greeting_and_bye() {
        let mut d = dispatcher(FakePresenter::new());
        let out = transcript(&mut d, "BYE\nSETDESC ignored\n").await;
        assert_eq!(out, "OK Pleased to meet you\nOK\n");
        assert_eq!(d.session().description, "Please enter your passphrase");
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let mut d = dispatcher(FakePresenter::new());
        let out = transcript(&mut d, "SETPROMPT PIN\n\n# note\nGETINFO tty_name").await;
        assert_eq!(out, "OK Pleased to meet you\nOK\nD %2Fdev%2Fpts%2F1\nOK\n");
    }

    #[tokio::test]
    async fn test_get_pin_transcript() {
        let mut d = dispatcher(
            FakePresenter::new().with_input(InputOutcome::entered(Credential::new("a b"), false)),
        );
        let out = transcript(
            &mut d,
            "SETDESC Enter%20PIN\r\nSETKEYINFO n/KEY\r\nGETPIN\r\nGETPIN\r\nbye\r\n",
        )
        .await;
        assert_eq!(
            out,
            "OK Pleased to meet you\nOK\nOK\nD a%20b\nOK\nERR 83886179 Operation cancelled\nOK\n"
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_session() {
        let mut d = dispatcher(FakePresenter::new());
        let mut output = Vec::new();
        let input: &[u8] = b"SETDESC caf\xe9\nGETINFO flavor\nBYE\n";
        serve(&mut d, input, &mut output).await.unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "OK Pleased to meet you\nOK\nD keypin\nOK\nOK\n"
        );
        assert_eq!(d.session().description, "caf\u{FFFD}");
    }

    #[test]
    fn test_is_bye() {
        assert!(is_bye("BYE"));
        assert!(is_bye("  bye  "));
        assert!(!is_bye("BYEBYE"));
        assert!(!is_bye("# BYE"));
    }
}
