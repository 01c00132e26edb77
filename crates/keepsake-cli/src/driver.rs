//! Wall-clock driver.
//!
//! Presentation time runs one virtual millisecond per wall millisecond from
//! the moment the presentation begins. One task waits for either the next
//! deadline or the next input line, whichever comes first.

use std::future;
use std::io::Write;
use std::time::Duration;

use keepsake_core::media::AmbientPlayback;
use keepsake_presentation::application::command_handlers::{advance_clock, handle_interaction};
use keepsake_presentation::application::query_handlers::get_view;
use keepsake_presentation::domain::aggregates::Presentation;
use keepsake_presentation::domain::commands::Interaction;
use keepsake_sequencer::Millis;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::error::AppError;
use crate::input::{CliCommand, USAGE, parse_command};
use crate::terminal::TerminalSurface;

/// Runs `presentation` until the input ends or the user quits.
///
/// # Errors
///
/// Returns `AppError` on terminal I/O failure or when the presentation
/// raises an error that is not about a single input line.
pub async fn run<W, P, R>(
    presentation: &mut Presentation<TerminalSurface<W>, P>,
    mut lines: Lines<R>,
) -> Result<(), AppError>
where
    W: Write,
    P: AmbientPlayback,
    R: AsyncBufRead + Unpin,
{
    let origin = Instant::now();
    presentation.surface_mut().notice(USAGE);
    presentation.begin()?;

    loop {
        check_output(presentation)?;
        let wake = presentation.next_deadline();
        let timer = async move {
            match wake {
                Some(at) => sleep_until(origin + Duration::from_millis(at)).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed");
                    break;
                };
                let events = advance_clock(presentation, elapsed_ms(origin))?;
                debug!(events = events.len(), "clock caught up");
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(CliCommand::Quit)) => break,
                    Ok(Some(CliCommand::Status)) => {
                        let view = serde_json::to_string(&get_view(presentation))?;
                        presentation.surface_mut().notice(&view);
                    }
                    Ok(Some(CliCommand::Input(input))) => {
                        let interaction = Interaction::new(input);
                        match handle_interaction(presentation, &interaction) {
                            Ok(events) => debug!(events = events.len(), "input applied"),
                            Err(e) => report(presentation, e.into())?,
                        }
                    }
                    Err(e) => report(presentation, e)?,
                }
            }
            () = timer => {
                advance_clock(presentation, elapsed_ms(origin))?;
            }
        }
    }

    info!(at_ms = presentation.now(), "presentation closed");
    check_output(presentation)
}

fn elapsed_ms(origin: Instant) -> Millis {
    Millis::try_from(origin.elapsed().as_millis()).unwrap_or(Millis::MAX)
}

fn report<W: Write, P: AmbientPlayback>(
    presentation: &mut Presentation<TerminalSurface<W>, P>,
    error: AppError,
) -> Result<(), AppError> {
    if !error.is_user_error() {
        return Err(error);
    }
    debug!(%error, "input rejected");
    presentation.surface_mut().notice(&format!("! {error}"));
    Ok(())
}

fn check_output<W: Write, P: AmbientPlayback>(
    presentation: &mut Presentation<TerminalSurface<W>, P>,
) -> Result<(), AppError> {
    match presentation.surface_mut().take_error() {
        Some(e) => Err(AppError::Io(e)),
        None => Ok(()),
    }
}
