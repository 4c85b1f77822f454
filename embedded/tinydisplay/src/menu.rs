//! # List Menu
//!
//! A framed, scrolling list of text items with one highlighted selection,
//! drawn through the engine so it works on surfaces and direct displays
//! alike.
//!
//! ```text
//!   ┌────────────────────┐  frame 4 px inside the area
//!   │ ░Item 0░░░░        │  row 1: first visible item, shown inverted
//!   │  Item 1            │
//!   │  ...               │  rows = area height / line height - 2
//!   └────────────────────┘
//! ```
//!
//! Navigation ([`Menu::down`], [`Menu::up`]) only moves the selection; call
//! [`Menu::update`] to redraw what changed.

use crate::engine::{self, FontStyle, PixelSink, TextMode};
use crate::font::FontTable;
use crate::geometry::Rect;

/// Gap between the area edge and the frame
const FRAME_INSET: i32 = 4;
/// Gap between the area edge and item text
const TEXT_INSET: i32 = 8;

/// Menu state over a borrowed list of items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Menu<'a> {
    items: &'a [&'a str],
    selection: usize,
    old_selection: usize,
    scroll: usize,
    /// Caller-space area; `None` covers the whole sink
    area: Option<Rect>,
}

/// Placement of one menu on one sink
#[derive(Debug, Clone, Copy)]
struct Layout {
    area: Rect,
    line: i32,
    rows: usize,
}

impl<'a> Menu<'a> {
    /// Menu over `items` with the first item selected
    pub fn new(items: &'a [&'a str]) -> Self {
        Self {
            items,
            selection: 0,
            old_selection: 0,
            scroll: 0,
            area: None,
        }
    }

    /// Confines the menu to a `width` x `height` area at `(left, top)`
    pub fn with_area(mut self, left: i32, top: i32, width: u16, height: u16) -> Self {
        self.area = Some(Rect::new(
            left,
            top,
            left.saturating_add(width as i32 - 1),
            top.saturating_add(height as i32 - 1),
        ));
        self
    }

    pub fn items(&self) -> &'a [&'a str] {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    /// Index of the first visible item
    pub fn scroll_position(&self) -> usize {
        self.scroll
    }

    /// Next item, wrapping to the first
    pub fn down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selection = if self.selection + 1 < self.items.len() {
            self.selection + 1
        } else {
            0
        };
    }

    /// Previous item, wrapping to the last
    pub fn up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selection = match self.selection {
            0 => self.items.len() - 1,
            n => n - 1,
        };
    }

    fn layout<S: PixelSink + ?Sized>(&self, sink: &S, font: &FontTable) -> Layout {
        let area = self.area.unwrap_or_else(|| {
            let origin = sink.offset();
            Rect::with_size(sink.width(), sink.height()).translate(origin.x, origin.y)
        });
        let line = (font.height() as i32).max(1);
        let rows = (area.height() / line - 2).max(0) as usize;
        Layout { area, line, rows }
    }

    /// First visible item once `selection` is on screen
    fn scroll_for(&self, selection: usize, rows: usize) -> usize {
        if selection < self.scroll || rows == 0 {
            selection
        } else if selection - self.scroll >= rows {
            selection + 1 - rows
        } else {
            self.scroll
        }
    }

    fn draw_item<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        font: &FontTable,
        layout: &Layout,
        index: usize,
    ) {
        let (Some(text), Some(row)) = (self.items.get(index), index.checked_sub(self.scroll))
        else {
            return;
        };
        let row = row as i32 + 1;
        let x = layout.area.p1.x.saturating_add(TEXT_INSET);
        let y = layout.area.p1.y.saturating_add(row * layout.line);

        let saved = sink.text_state().mode;
        let mut mode = saved - TextMode::TRANSPARENT - TextMode::INVERSE;
        if index == self.selection {
            mode |= TextMode::INVERSE;
        }
        sink.text_state_mut().mode = mode;
        engine::print_fixed(sink, font, x, y, text, FontStyle::Normal);
        sink.text_state_mut().mode = saved;
    }

    /// Draws the frame and every visible item, scrolling so the selection
    /// is on screen
    pub fn show<S: PixelSink + ?Sized>(&mut self, sink: &mut S, font: &FontTable) {
        let layout = self.layout(sink, font);
        let Rect { p1, p2 } = layout.area;
        engine::draw_rect(
            sink,
            p1.x.saturating_add(FRAME_INSET),
            p1.y.saturating_add(FRAME_INSET),
            p2.x.saturating_sub(FRAME_INSET),
            p2.y.saturating_sub(FRAME_INSET),
        );
        self.scroll = self.scroll_for(self.selection, layout.rows);
        let end = self.items.len().min(self.scroll + layout.rows);
        for index in self.scroll..end {
            self.draw_item(sink, font, &layout, index);
        }
        self.old_selection = self.selection;
        log::trace!(
            "menu: {} items, rows {}..{}, selection {}",
            self.items.len(),
            self.scroll,
            end,
            self.selection
        );
    }

    /// Redraws after navigation. Only the two affected items are repainted
    /// unless the list has to scroll, which clears the area and redraws it.
    pub fn update<S: PixelSink + ?Sized>(&mut self, sink: &mut S, font: &FontTable) {
        if self.selection == self.old_selection {
            return;
        }
        let layout = self.layout(sink, font);
        if self.scroll_for(self.selection, layout.rows) != self.scroll {
            let Rect { p1, p2 } = layout.area;
            engine::clear_rect(sink, p1.x, p1.y, p2.x, p2.y);
            self.show(sink, font);
        } else {
            self.draw_item(sink, font, &layout, self.old_selection);
            self.draw_item(sink, font, &layout, self.selection);
            self.old_selection = self.selection;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ssd1306::replay_gdram;
    use crate::device::{DirectDisplay, Ssd1306, Ssd1306Variant};
    use crate::font::FONT_6X8;
    use crate::hal::mock::RecordingInterface;
    use crate::surface::{Mono1, PixelSurface};

    static TEN: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

    fn font() -> FontTable<'static> {
        FontTable::fixed(&FONT_6X8).unwrap()
    }

    #[test]
    fn test_navigation_wraps() {
        let mut menu = Menu::new(&TEN[..3]);
        assert_eq!(menu.selection(), 0);
        menu.up();
        assert_eq!(menu.selection(), 2);
        menu.down();
        assert_eq!(menu.selection(), 0);
        menu.down();
        assert_eq!(menu.selection(), 1);

        let mut empty = Menu::new(&[]);
        empty.down();
        empty.up();
        assert_eq!(empty.selection(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_selected_item_is_inverted() {
        let items = ["A", "A", "B"];
        let mut buf = [0u8; 1024];
        let mut s = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        let mut menu = Menu::new(&items);
        menu.show(&mut s, &font());

        // frame corners
        assert_eq!(s.get_pixel(4, 4), Some(1));
        assert_eq!(s.get_pixel(123, 59), Some(1));
        // item 0 on page 1 is the complement of item 1 on page 2
        let page1 = s.buffer()[128 + 8..128 + 14].to_vec();
        let page2 = s.buffer()[256 + 8..256 + 14].to_vec();
        assert!(page2.iter().any(|&b| b != 0));
        for (a, b) in page1.iter().zip(&page2) {
            assert_eq!(*a, !*b);
        }
        // text mode is left as it was
        assert_eq!(s.text_mode(), TextMode::empty());
    }

    #[test]
    fn test_update_moves_highlight() {
        let items = ["A", "A", "B"];
        let mut buf = [0u8; 1024];
        let mut s = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        let mut menu = Menu::new(&items);
        menu.show(&mut s, &font());
        let first = s.buffer()[128 + 8..128 + 14].to_vec();
        let second = s.buffer()[256 + 8..256 + 14].to_vec();

        menu.down();
        menu.update(&mut s, &font());
        assert_eq!(&s.buffer()[128 + 8..128 + 14], &second[..]);
        assert_eq!(&s.buffer()[256 + 8..256 + 14], &first[..]);
        assert_eq!(menu.scroll_position(), 0);
    }

    #[test]
    fn test_scrolls_to_keep_selection_visible() {
        let mut buf = [0u8; 1024];
        let mut s = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        let mut menu = Menu::new(&TEN);
        menu.show(&mut s, &font());
        // 64 px / 8 px lines leaves 6 item rows
        for _ in 0..7 {
            menu.down();
            menu.update(&mut s, &font());
        }
        assert_eq!(menu.selection(), 7);
        assert_eq!(menu.scroll_position(), 2);

        let mut reference_buf = [0u8; 1024];
        let mut reference = PixelSurface::<Mono1>::new(128, 64, &mut reference_buf).unwrap();
        let mut fresh = Menu::new(&TEN);
        for _ in 0..7 {
            fresh.down();
        }
        fresh.show(&mut reference, &font());
        assert_eq!(fresh.scroll_position(), 2);
        assert_eq!(s.buffer(), reference.buffer());

        menu.down();
        menu.down();
        menu.down();
        menu.update(&mut s, &font());
        assert_eq!(menu.selection(), 0);
        assert_eq!(menu.scroll_position(), 0);
    }

    #[test]
    fn test_area_confines_menu() {
        let mut buf = [0u8; 1024];
        let mut s = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        let mut menu = Menu::new(&TEN).with_area(64, 0, 64, 32);
        menu.show(&mut s, &font());
        assert_eq!(s.get_pixel(68, 4), Some(1));
        assert_eq!(s.get_pixel(123, 27), Some(1));
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(s.get_pixel(x, y), Some(0), "pixel ({}, {})", x, y);
            }
        }
        // 32 px / 8 px lines leaves 2 item rows
        menu.down();
        menu.down();
        menu.update(&mut s, &font());
        assert_eq!(menu.scroll_position(), 1);
    }

    #[test]
    fn test_direct_display_matches_surface() {
        let items = ["Start", "Settings", "About"];
        let mut buf = [0u8; 1024];
        let mut s = PixelSurface::<Mono1>::new(128, 64, &mut buf).unwrap();
        let mut on_surface = Menu::new(&items);
        on_surface.show(&mut s, &font());
        on_surface.down();
        on_surface.update(&mut s, &font());

        let mut display =
            DirectDisplay::new(Ssd1306::new(RecordingInterface::new(), Ssd1306Variant::W128H64));
        let mut direct = Menu::new(&items);
        direct.show(&mut display, &font());
        direct.down();
        direct.update(&mut display, &font());
        let intf = display.release().release();
        assert!(intf.is_balanced());
        assert_eq!(s.buffer(), &replay_gdram(&intf, 64)[..]);
    }
}
