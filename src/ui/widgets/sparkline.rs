//! Daily volume bars, one column per day

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::ui::view_model::DailyBar;

const BAR_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Vertical bars filling the whole area height; green on net-inflow days
pub struct VolumeBars<'a> {
    bars: &'a [DailyBar],
    inflow: Style,
    outflow: Style,
}

impl<'a> VolumeBars<'a> {
    pub fn new(bars: &'a [DailyBar]) -> Self {
        Self {
            bars,
            inflow: Style::default().fg(Color::LightGreen),
            outflow: Style::default().fg(Color::LightRed),
        }
    }
}

/// Bar height in eighths of a cell
fn eighths(value: u64, max: u64, rows: u16) -> u64 {
    let total = rows as u64 * 8;
    if max == 0 {
        return 0;
    }
    let scaled = (value as u128 * total as u128 + max as u128 / 2) / max as u128;
    // non-zero days stay visible
    (scaled as u64).max(u64::from(value > 0)).min(total)
}

impl<'a> Widget for VolumeBars<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.bars.is_empty() {
            return;
        }

        // Most recent days that fit
        let count = self.bars.len().min(area.width as usize);
        let visible = &self.bars[self.bars.len() - count..];
        let max = visible.iter().map(|b| b.height).max().unwrap_or(0);

        for (i, bar) in visible.iter().enumerate() {
            let x = area.x + i as u16;
            let style = if bar.positive { self.inflow } else { self.outflow };
            let mut remaining = eighths(bar.height, max, area.height);

            for row in (0..area.height).rev() {
                if remaining == 0 {
                    break;
                }
                let fill = remaining.min(8);
                let y = area.y + row;
                buf.get_mut(x, y)
                    .set_char(BAR_CHARS[fill as usize - 1])
                    .set_style(style);
                remaining -= fill;
            }
        }
    }
}
