use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::domain::{DomainState, Status, Transition};
use crate::engine::{Deadline, TransitionNotice};
use crate::report::{format_duration, format_hundredths, per_second_x100};
use crate::system::shutdown_handlers::ShutdownSender;

pub(crate) struct MonitorSettings {
    pub(crate) started: Instant,
    pub(crate) interval: Duration,
    pub(crate) no_color: bool,
}

/// Read-only live view of the run. Never touches worker state beyond the
/// lock-free counters and a momentary flag read.
///
/// Status frames stop at the deadline or on shutdown. Notices keep printing
/// until every worker has dropped its sender, so edges fired by in-flight
/// requests during the wind-down still show up.
pub(crate) fn spawn_monitor(
    states: Vec<Arc<DomainState>>,
    deadline: Arc<Deadline>,
    mut notices: mpsc::UnboundedReceiver<TransitionNotice>,
    shutdown_tx: &ShutdownSender,
    settings: MonitorSettings,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let interactive = std::io::stdout().is_terminal();
        let mut ticker = tokio::time::interval(settings.interval.max(Duration::from_millis(1)));
        let run_end = tokio::time::sleep_until(deadline.at());
        tokio::pin!(run_end);
        let mut notices_open = true;
        let mut interrupted = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let frame = MonitorFrame::capture(&states, &deadline, settings.started, Instant::now());
                    if render_status(&frame, interactive, settings.no_color).is_err() {
                        break;
                    }
                }
                notice = notices.recv(), if notices_open => match notice {
                    Some(notice) => {
                        if print_notice(&notice, interactive, settings.no_color).is_err() {
                            break;
                        }
                    }
                    None => notices_open = false,
                },
                () = &mut run_end => break,
                _ = shutdown_rx.recv() => {
                    interrupted = true;
                    break;
                }
            }
        }

        let frame = MonitorFrame::capture(&states, &deadline, settings.started, Instant::now());
        drop(states);
        if render_status(&frame, interactive, settings.no_color).is_ok() && interactive {
            drop(finish_line());
        }

        if interrupted || deadline.is_halted() || Instant::now() < deadline.at() {
            println!("\nInterrupted, waiting for workers to finish in-flight requests...");
        } else {
            println!("\nTime is up, waiting for workers to finish in-flight requests...");
        }
        while let Some(notice) = notices.recv().await {
            if print_notice(&notice, interactive, settings.no_color).is_err() {
                return;
            }
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DomainLine {
    pub(crate) name: String,
    pub(crate) status: Status,
    pub(crate) failures: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonitorFrame {
    pub(crate) remaining: Duration,
    pub(crate) throughput_x100: u64,
    pub(crate) domains: Vec<DomainLine>,
}

impl MonitorFrame {
    pub(crate) fn capture(
        states: &[Arc<DomainState>],
        deadline: &Deadline,
        started: Instant,
        now: Instant,
    ) -> Self {
        let mut total: u64 = 0;
        let mut domains = Vec::with_capacity(states.len());
        for state in states {
            let counters = state.counters();
            total = total.saturating_add(counters.total);
            domains.push(DomainLine {
                name: state.domain().name().to_owned(),
                status: state.status(),
                failures: counters.failure,
            });
        }
        Self {
            remaining: deadline.remaining(now),
            throughput_x100: per_second_x100(total, now.saturating_duration_since(started)),
            domains,
        }
    }
}

struct StatusSegment {
    text: String,
    color: Option<Color>,
}

impl StatusSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}

fn status_line(frame: &MonitorFrame) -> Vec<StatusSegment> {
    let mut segments = vec![
        StatusSegment::colored(
            format!("[{} left]", format_duration(frame.remaining)),
            Color::Yellow,
        ),
        StatusSegment::colored(
            format!(" {} req/s", format_hundredths(frame.throughput_x100)),
            Color::Cyan,
        ),
    ];
    for domain in &frame.domains {
        segments.push(StatusSegment::plain(format!(" | {}: ", domain.name)));
        let color = match domain.status {
            Status::Up => Color::Green,
            Status::Down => Color::Red,
        };
        segments.push(StatusSegment::colored(domain.status.to_string(), color));
        segments.push(StatusSegment::plain(format!(" ({} failed)", domain.failures)));
    }
    segments
}

fn plain_text(segments: &[StatusSegment]) -> String {
    segments.iter().map(|segment| segment.text.as_str()).collect()
}

fn render_status(
    frame: &MonitorFrame,
    interactive: bool,
    no_color: bool,
) -> Result<(), std::io::Error> {
    let segments = status_line(frame);
    let mut out = std::io::stdout();
    if !interactive {
        writeln!(out, "{}", plain_text(&segments))?;
        return out.flush();
    }

    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in &segments {
        match segment.color {
            Some(color) if !no_color => queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?,
            Some(_) | None => queue!(out, Print(&segment.text))?,
        }
    }
    out.flush()
}

/// Prints an edge on its own line. On a terminal the status line is cleared
/// first and redrawn on the next tick.
fn print_notice(
    notice: &TransitionNotice,
    interactive: bool,
    no_color: bool,
) -> Result<(), std::io::Error> {
    let text = notice.describe();
    let mut out = std::io::stdout();
    if !interactive {
        writeln!(out, "{}", text)?;
        return out.flush();
    }

    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    if no_color {
        queue!(out, Print(&text), Print("\n"))?;
    } else {
        let color = match notice.transition {
            Transition::Down { .. } => Color::Red,
            Transition::Up { .. } => Color::Green,
        };
        queue!(
            out,
            SetForegroundColor(color),
            Print(&text),
            ResetColor,
            Print("\n")
        )?;
    }
    out.flush()
}

fn finish_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stdout();
    out.write_all(b"\n")?;
    out.flush()
}
