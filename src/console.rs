use std::{cell::RefCell, io::Write, rc::Rc};

use anyhow::{Context, Result};
use log::warn;

use crate::host::{Label, Screen};

/// 画面をクリアしてカーソルを先頭に戻すエスケープシーケンス。
const CLEAR: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Default)]
struct LabelState {
    text: String,
    centered: bool,
}

struct ConsoleState<W: Write> {
    writer: W,
    width: usize,
    clear: bool,
    loaded: bool,
    labels: Vec<LabelState>,
    /// `clean`の度に増やし、それ以前に作られたラベルを無効にする。
    generation: u64,
}

impl<W: Write> ConsoleState<W> {
    /// 表示中であれば、全てのラベルを描画し直す。
    fn redraw(&mut self) {
        if !self.loaded {
            return;
        }
        if let Err(err) = self.draw() {
            warn!("{:#}", err);
        }
    }

    fn draw(&mut self) -> Result<()> {
        if self.clear {
            write!(self.writer, "{}", CLEAR).context("Failed to clear console")?;
        }
        for label in &self.labels {
            for line in label.text.lines() {
                let padding = if label.centered {
                    self.width.saturating_sub(line.chars().count()) / 2
                } else {
                    0
                };
                writeln!(self.writer, "{:padding$}{}", "", line, padding = padding)
                    .with_context(|| format!("Failed to write label: {:?}", label.text))?;
            }
        }
        self.writer.flush().context("Failed to flush console")?;
        Ok(())
    }
}

/// ターミナルを画面として扱う`Screen`。
pub struct ConsoleScreen<W: Write> {
    state: Rc<RefCell<ConsoleState<W>>>,
}

impl<W: Write> ConsoleScreen<W> {
    /// 新しい`ConsoleScreen`を返す。
    ///
    /// # Arguments
    ///
    /// * `writer` - 描画先
    /// * `width` - 中央寄せに利用する画面幅(文字数)
    /// * `clear` - 描画の度に画面をクリアするかどうか
    pub fn new(writer: W, width: usize, clear: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(ConsoleState {
                writer,
                width,
                clear,
                loaded: false,
                labels: Vec::new(),
                generation: 0,
            })),
        }
    }
}

impl<W: Write> Screen for ConsoleScreen<W> {
    type Label = ConsoleLabel<W>;

    fn create_label(&mut self) -> ConsoleLabel<W> {
        let mut state = self.state.borrow_mut();
        state.labels.push(LabelState::default());
        ConsoleLabel {
            state: Rc::clone(&self.state),
            index: state.labels.len() - 1,
            generation: state.generation,
        }
    }

    fn load(&mut self) {
        let mut state = self.state.borrow_mut();
        state.loaded = true;
        state.redraw();
    }

    fn clean(&mut self) {
        let mut state = self.state.borrow_mut();
        state.labels.clear();
        state.generation += 1;
        state.redraw();
    }
}

/// `ConsoleScreen`上のラベル。
pub struct ConsoleLabel<W: Write> {
    state: Rc<RefCell<ConsoleState<W>>>,
    index: usize,
    generation: u64,
}

impl<W: Write> ConsoleLabel<W> {
    fn update(&mut self, f: impl FnOnce(&mut LabelState)) {
        let mut state = self.state.borrow_mut();
        // clean前に作られたラベルは何もしない
        if state.generation != self.generation {
            return;
        }
        if let Some(label) = state.labels.get_mut(self.index) {
            f(label);
            state.redraw();
        }
    }
}

impl<W: Write> Label for ConsoleLabel<W> {
    fn set_text(&mut self, text: &str) {
        self.update(|label| label.text = text.to_string());
    }

    fn center(&mut self) {
        self.update(|label| label.centered = true);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io::Write, rc::Rc};

    use super::ConsoleScreen;
    use crate::host::{Label, Screen};

    /// 書き込まれた内容をテストから参照するためのwriter。
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn take(&self) -> String {
            String::from_utf8(self.0.borrow_mut().drain(..).collect()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// 画面をloadするまでは描画しない。
    #[test]
    fn test_draw_after_load() {
        let buffer = SharedBuffer::default();
        let mut screen = ConsoleScreen::new(buffer.clone(), 20, false);
        let mut label = screen.create_label();

        label.set_text("Loading Toggl...");
        assert_eq!(buffer.take(), "");

        screen.load();
        assert_eq!(buffer.take(), "Loading Toggl...\n");

        label.set_text("Write docs\nRunning: 0:00:09");
        assert_eq!(buffer.take(), "Write docs\nRunning: 0:00:09\n");
    }

    #[test]
    fn test_center() {
        let buffer = SharedBuffer::default();
        let mut screen = ConsoleScreen::new(buffer.clone(), 20, false);
        let mut label = screen.create_label();
        label.center();
        screen.load();
        buffer.take();

        label.set_text("abcd\nabcdefgh");

        assert_eq!(buffer.take(), "        abcd\n      abcdefgh\n");
    }

    #[test]
    fn test_clear() {
        let buffer = SharedBuffer::default();
        let mut screen = ConsoleScreen::new(buffer.clone(), 20, true);
        let mut label = screen.create_label();
        screen.load();
        buffer.take();

        label.set_text("No network.");

        assert_eq!(buffer.take(), "\x1b[2J\x1b[HNo network.\n");
    }

    /// clean後はラベルを更新しても描画しない。
    #[test]
    fn test_clean() {
        let buffer = SharedBuffer::default();
        let mut screen = ConsoleScreen::new(buffer.clone(), 20, true);
        let mut label = screen.create_label();
        screen.load();
        label.set_text("Loading Toggl...");
        buffer.take();

        screen.clean();
        assert_eq!(buffer.take(), "\x1b[2J\x1b[H");

        label.set_text("No timer running.");
        assert_eq!(buffer.take(), "");
    }

    /// clean前のラベルは、clean後に作られたラベルを書き換えない。
    #[test]
    fn test_stale_label_after_clean() {
        let buffer = SharedBuffer::default();
        let mut screen = ConsoleScreen::new(buffer.clone(), 20, false);
        let mut stale = screen.create_label();
        screen.load();
        screen.clean();
        let mut label = screen.create_label();
        label.set_text("Loading Toggl...");
        buffer.take();

        stale.set_text("No network.");
        stale.center();
        assert_eq!(buffer.take(), "");

        label.set_text("No timer running.");
        assert_eq!(buffer.take(), "No timer running.\n");
    }
}
