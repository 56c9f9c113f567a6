use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::{Margin, Rect};
use ratatui::style::palette::tailwind;
use ratatui::style::Style as UiStyle;
use ratatui::text::Text;
use ratatui::widgets::{Block, Paragraph, Widget};

pub enum Action {
    InputTaken,
    InputConfirm,
    InputCancel,
    InputIgnored,
}

#[derive(Clone)]
pub struct Style {
    pub default: UiStyle,
    pub focused: UiStyle,
    pub cursor: UiStyle,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            default: UiStyle::default()
                .fg(tailwind::WHITE)
                .bg(tailwind::SLATE.c950),
            focused: UiStyle::default()
                .fg(tailwind::INDIGO.c400)
                .bg(tailwind::SLATE.c950),
            cursor: UiStyle::default()
                .fg(tailwind::WHITE)
                .bg(tailwind::INDIGO.c600),
        }
    }
}

/// Single line text input with a cursor, used to edit one register cell
pub struct InputField {
    input: String,
    style: Style,
    title: Option<String>,
    cursor_pos: usize,
}

impl Widget for &InputField {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::bordered().style(self.style.focused);
        if let Some(title) = self.title.as_ref() {
            block = block.title(title.clone());
        }
        let inner = block.inner(area);
        block.render(area, buf);
        let area = inner.inner(Margin {
            vertical: 0,
            horizontal: 1,
        });
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Keep the cursor visible if the input is wider than the field
        let text = format!("{} ", self.input);
        let width = area.width as usize;
        let x_start = (self.cursor_pos + 1).saturating_sub(width);
        let x_end = std::cmp::min(text.len(), x_start + width);

        Paragraph::new(Text::from(text[x_start..x_end].to_owned()).style(self.style.default))
            .render(area, buf);
        buf[(area.x + (self.cursor_pos - x_start) as u16, area.y)].set_style(self.style.cursor);
    }
}

impl InputField {
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            cursor_pos: input.len(),
            input,
            style: Style::default(),
            title: None,
        }
    }

    pub fn title(self, title: String) -> Self {
        Self {
            title: Some(title),
            ..self
        }
    }

    pub fn style(self, style: Style) -> Self {
        Self { style, ..self }
    }

    pub fn handle_events(&mut self, modifiers: KeyModifiers, code: KeyCode) -> Action {
        match (modifiers, code) {
            (_, KeyCode::Home) => {
                self.cursor_pos = 0;
                Action::InputTaken
            }
            (_, KeyCode::End) => {
                self.cursor_pos = self.input.len();
                Action::InputTaken
            }
            (_, KeyCode::Char(c)) if c.is_ascii() && !c.is_ascii_control() => {
                self.input.insert(self.cursor_pos, c);
                self.cursor_pos += 1;
                Action::InputTaken
            }
            (_, KeyCode::Backspace) => {
                if self.cursor_pos > 0 {
                    self.input.remove(self.cursor_pos - 1);
                    self.cursor_pos -= 1;
                }
                Action::InputTaken
            }
            (_, KeyCode::Delete) => {
                if self.cursor_pos < self.input.len() {
                    self.input.remove(self.cursor_pos);
                }
                Action::InputTaken
            }
            (_, KeyCode::Left) => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
                Action::InputTaken
            }
            (_, KeyCode::Right) => {
                self.cursor_pos = std::cmp::min(self.cursor_pos + 1, self.input.len());
                Action::InputTaken
            }
            (_, KeyCode::Enter) => Action::InputConfirm,
            (_, KeyCode::Esc) => Action::InputCancel,
            _ => Action::InputIgnored,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, InputField};
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::widgets::Widget;

    fn press(field: &mut InputField, code: KeyCode) -> Action {
        field.handle_events(KeyModifiers::NONE, code)
    }

    #[test]
    fn ut_input_field_editing() {
        let mut field = InputField::new("12");
        press(&mut field, KeyCode::Char('3'));
        press(&mut field, KeyCode::Home);
        press(&mut field, KeyCode::Delete);
        press(&mut field, KeyCode::Right);
        press(&mut field, KeyCode::Char('0'));
        press(&mut field, KeyCode::End);
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.input(), "20");

        assert!(matches!(press(&mut field, KeyCode::Enter), Action::InputConfirm));
        assert!(matches!(press(&mut field, KeyCode::Esc), Action::InputCancel));
        assert!(matches!(press(&mut field, KeyCode::F(1)), Action::InputIgnored));
    }

    #[test]
    fn ut_input_field_render() {
        let field = InputField::new("65535").title(String::from(" 40001 "));
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        (&field).render(area, &mut buf);
        let line: String = (0..12).map(|x| buf[(x, 1)].symbol().to_owned()).collect();
        assert!(line.contains("65535"));
    }
}
