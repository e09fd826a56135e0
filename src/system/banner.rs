use std::io::IsTerminal;

use crossterm::style::{Color, Stylize};

const BANNER_LINES: [&str; 7] = [
    "███████╗██╗████████╗███████╗███████╗████████╗██████╗ ███████╗███████╗███████╗",
    "██╔════╝██║╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔══██╗██╔════╝██╔════╝██╔════╝",
    "███████╗██║   ██║   █████╗  ███████╗   ██║   ██████╔╝█████╗  ███████╗███████╗",
    "╚════██║██║   ██║   ██╔══╝  ╚════██║   ██║   ██╔══██╗██╔══╝  ╚════██║╚════██║",
    "███████║██║   ██║   ███████╗███████║   ██║   ██║  ██║███████╗███████║███████║",
    "╚══════╝╚═╝   ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚═╝  ╚═╝╚══════╝╚══════╝╚══════╝",
    "                                                                             ",
];

const COLOR_START: (u8, u8, u8) = (0xff, 0x4d, 0x4d);
const COLOR_MID: (u8, u8, u8) = (0xff, 0xa6, 0x3d);
const COLOR_END: (u8, u8, u8) = (0xff, 0xd8, 0x4d);
const SUBTITLE_RGB: (u8, u8, u8) = (0xff, 0xa6, 0x3d);
const NOTICE_RGB: (u8, u8, u8) = (0xff, 0x4d, 0x4d);

const AUTHORIZATION_NOTICE: &str =
    "Only run this against systems you own or are explicitly authorized to test.";

pub(crate) fn print_cli_banner(no_color: bool) {
    let use_color = !no_color && std::io::stdout().is_terminal();
    let denom = BANNER_LINES.len().saturating_sub(1);
    for (idx, line) in BANNER_LINES.iter().enumerate() {
        if use_color {
            let (r, g, b) = tri_gradient_rgb(COLOR_START, COLOR_MID, COLOR_END, idx, denom);
            println!("{}", line.with(Color::Rgb { r, g, b }));
        } else {
            println!("{line}");
        }
    }

    let description = format!(
        "sitestress v{} | availability under sustained load",
        env!("CARGO_PKG_VERSION")
    );
    print_rgb(&description, SUBTITLE_RGB, use_color);
    print_rgb(AUTHORIZATION_NOTICE, NOTICE_RGB, use_color);
    println!();
}

fn print_rgb(text: &str, (r, g, b): (u8, u8, u8), use_color: bool) {
    if use_color {
        println!("{}", text.with(Color::Rgb { r, g, b }));
    } else {
        println!("{text}");
    }
}

fn gradient_rgb(start: (u8, u8, u8), end: (u8, u8, u8), idx: usize, denom: usize) -> (u8, u8, u8) {
    let denom = i32::try_from(denom.max(1)).unwrap_or(i32::MAX);
    let idx = i32::try_from(idx).unwrap_or(i32::MAX).min(denom);
    let lerp = |a: u8, b: u8| -> u8 {
        let a = i32::from(a);
        let b = i32::from(b);
        let value = b
            .checked_sub(a)
            .and_then(|delta| delta.checked_mul(idx))
            .and_then(|scaled| scaled.checked_div(denom))
            .and_then(|step| a.checked_add(step))
            .unwrap_or(a);
        u8::try_from(value.clamp(0, 255)).unwrap_or(0)
    };
    (
        lerp(start.0, end.0),
        lerp(start.1, end.1),
        lerp(start.2, end.2),
    )
}

fn tri_gradient_rgb(
    start: (u8, u8, u8),
    mid: (u8, u8, u8),
    end: (u8, u8, u8),
    idx: usize,
    denom: usize,
) -> (u8, u8, u8) {
    let denom = denom.max(1);
    let half = denom / 2;
    if idx <= half {
        gradient_rgb(start, mid, idx, half)
    } else {
        gradient_rgb(
            mid,
            end,
            idx.saturating_sub(half),
            denom.saturating_sub(half),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};

    #[test]
    fn banner_lines_share_a_width() -> AppResult<()> {
        let widths: Vec<usize> = BANNER_LINES
            .iter()
            .map(|line| line.chars().count())
            .collect();
        if widths.windows(2).any(|pair| pair.first() != pair.last()) {
            return Err(AppError::validation(format!(
                "Uneven banner widths: {:?}",
                widths
            )));
        }
        Ok(())
    }

    #[test]
    fn gradient_hits_its_endpoints() -> AppResult<()> {
        let denom = BANNER_LINES.len().saturating_sub(1);
        if tri_gradient_rgb(COLOR_START, COLOR_MID, COLOR_END, 0, denom) != COLOR_START {
            return Err(AppError::validation("Expected first line at start color"));
        }
        if tri_gradient_rgb(COLOR_START, COLOR_MID, COLOR_END, denom, denom) != COLOR_END {
            return Err(AppError::validation("Expected last line at end color"));
        }
        Ok(())
    }
}
