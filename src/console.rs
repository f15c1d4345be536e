use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io;
use std::rc::Rc;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};
use model::{
    scheduler, Board, Controller, CreateUserInterface, Game, GameUpdateHandler, SlideDirection,
    Tile, UserInterface,
};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

const CELL_WIDTH: usize = 6;

const CONTROLS: &str = "arrows or w/a/s/d: slide | q/esc: quit";

#[derive(Debug, PartialEq)]
enum Command {
    Slide(SlideDirection),
    Quit,
}

/// Maps a key press to a command. Releases and repeats are ignored.
fn key_command(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(Command::Slide(SlideDirection::Up)),
        KeyCode::Down => Some(Command::Slide(SlideDirection::Down)),
        KeyCode::Left => Some(Command::Slide(SlideDirection::Left)),
        KeyCode::Right => Some(Command::Slide(SlideDirection::Right)),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char(c) => c.to_string().parse().ok().map(Command::Slide),
        _ => None,
    }
}

fn cell_text(value: Option<u32>) -> String {
    match value {
        Some(value) => format!("{:>width$}", value, width = CELL_WIDTH),
        None => format!("{:>width$}", ".", width = CELL_WIDTH),
    }
}

/// Text mirror of the board, kept current from controller notifications.
///
/// Only cells touched since the last draw are re-rendered.
pub struct ConsoleView {
    cols: usize,
    values: RefCell<Vec<Option<u32>>>,
    texts: RefCell<Vec<String>>,
    dirty: RefCell<BTreeSet<usize>>,
}

impl ConsoleView {
    pub fn new(board: &Board) -> Self {
        let values: Vec<Option<u32>> = board
            .to_array()
            .iter()
            .map(|&v| if v == 0 { None } else { Some(v) })
            .collect();
        let texts = values.iter().map(|&v| cell_text(v)).collect();
        Self {
            cols: board.cols(),
            values: RefCell::new(values),
            texts: RefCell::new(texts),
            dirty: RefCell::new(BTreeSet::new()),
        }
    }

    fn set(&self, tile: &Tile, value: Option<u32>) {
        let index = tile.row() * self.cols + tile.column();
        self.values.borrow_mut()[index] = value;
        self.dirty.borrow_mut().insert(index);
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.borrow().is_empty()
    }

    /// Re-renders dirty cells and returns the whole grid.
    pub fn draw(&self) -> String {
        let values = self.values.borrow();
        let mut texts = self.texts.borrow_mut();
        for index in std::mem::take(&mut *self.dirty.borrow_mut()) {
            texts[index] = cell_text(values[index]);
        }
        let mut grid = String::new();
        for row in texts.chunks(self.cols) {
            grid.push_str(&row.concat());
            grid.push('\n');
        }
        grid
    }
}

impl GameUpdateHandler for ConsoleView {
    fn end_update(&self, _board: &Board) {
        debug!("{} cells to redraw", self.dirty.borrow().len());
    }
    fn tile_added(&self, tile: &Tile) {
        self.set(tile, Some(tile.value()));
    }
    fn tile_removed(&self, tile: &Tile) {
        self.set(tile, None);
    }
    fn tile_value_changed(&self, tile: &Tile) {
        self.set(tile, Some(tile.value()));
    }
}

fn render(frame: &mut Frame, grid: &str) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    let board = Paragraph::new(grid)
        .block(Block::default().borders(Borders::ALL).title("2048"))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(board, chunks[0]);

    let controls = Paragraph::new(CONTROLS)
        .block(Block::default().borders(Borders::ALL).title("Controls"))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    frame.render_widget(controls, chunks[1]);
}

pub struct ConsoleInterface<B: Backend, I> {
    controller: Rc<Controller>,
    view: Rc<ConsoleView>,
    terminal: Terminal<B>,
    events: I,
}

impl<B: Backend, I> ConsoleInterface<B, I> {
    fn draw(&mut self) -> Result<()> {
        let grid = self.view.draw();
        self.terminal
            .draw(|frame| render(frame, &grid))
            .context("drawing board")?;
        Ok(())
    }
}

impl<B, I> UserInterface for ConsoleInterface<B, I>
where
    B: Backend,
    I: Iterator<Item = io::Result<Event>>,
{
    fn run(&mut self) -> Result<()> {
        self.draw()?;
        while let Some(event) = self.events.next() {
            match event.context("reading terminal event")? {
                Event::Key(key) => match key_command(&key) {
                    Some(Command::Quit) => break,
                    Some(Command::Slide(direction)) => {
                        self.controller.handle_slide(direction);
                        scheduler::run();
                        if self.view.is_dirty() {
                            self.draw()?;
                        }
                    }
                    None => debug!("ignoring key {:?}", key.code),
                },
                Event::Resize(..) => self.draw()?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Terminal front end drawing to `terminal` and reading key presses from `events`.
pub fn create_console<B, I>(terminal: Terminal<B>, events: I) -> CreateUserInterface
where
    B: Backend + 'static,
    I: Iterator<Item = io::Result<Event>> + 'static,
{
    Box::new(move |game: &mut Game| {
        let controller = game.controller();
        let view = Rc::new(ConsoleView::new(&controller.board().borrow()));
        controller.set_game_update_handler(view.clone());
        if controller.spawn_tile().is_none() {
            warn!("no room for the first tile");
        }
        Box::new(ConsoleInterface {
            controller,
            view,
            terminal,
            events,
        }) as Box<dyn UserInterface>
    })
}

/// Raw mode on the alternate screen for as long as the guard lives.
pub struct RawTerminal(());

impl RawTerminal {
    pub fn enter() -> Result<Self> {
        crossterm::terminal::enable_raw_mode().context("enabling raw mode")?;
        let guard = RawTerminal(());
        crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)
            .context("entering alternate screen")?;
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(e) = crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)
        {
            warn!("leaving alternate screen: {}", e);
        }
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            warn!("disabling raw mode: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::GameConfig;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn config(rows: usize, cols: usize) -> GameConfig {
        GameConfig {
            rows,
            cols,
            spawn_delay: Duration::ZERO,
            seed: Some(3),
        }
    }

    fn press(code: KeyCode) -> io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(40, 12)).unwrap()
    }

    fn command(code: KeyCode) -> Option<Command> {
        key_command(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn arrow_keys_slide() {
        use SlideDirection::*;
        assert_eq!(command(KeyCode::Up), Some(Command::Slide(Up)));
        assert_eq!(command(KeyCode::Down), Some(Command::Slide(Down)));
        assert_eq!(command(KeyCode::Left), Some(Command::Slide(Left)));
        assert_eq!(command(KeyCode::Right), Some(Command::Slide(Right)));
    }

    #[test]
    fn letter_keys_slide() {
        use SlideDirection::*;
        assert_eq!(command(KeyCode::Char('w')), Some(Command::Slide(Up)));
        assert_eq!(command(KeyCode::Char('a')), Some(Command::Slide(Left)));
        assert_eq!(command(KeyCode::Char('s')), Some(Command::Slide(Down)));
        assert_eq!(command(KeyCode::Char('d')), Some(Command::Slide(Right)));
        assert_eq!(command(KeyCode::Char('D')), Some(Command::Slide(Right)));
        assert_eq!(command(KeyCode::Char('x')), None);
        assert_eq!(command(KeyCode::Enter), None);
    }

    #[test]
    fn quit_keys() {
        assert_eq!(command(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(command(KeyCode::Esc), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_command(&ctrl_c), Some(Command::Quit));
        assert_eq!(command(KeyCode::Char('c')), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(key_command(&release), None);
    }

    #[test]
    fn view_redraws_changed_cells() {
        let mut board = Board::new(1, 2);
        let view = ConsoleView::new(&board);
        assert_eq!(view.draw(), "     .     .\n");

        board.add_tile(0, 1);
        let tile = board.get_tile(0, 1).unwrap();
        view.tile_added(tile);
        assert!(view.is_dirty());
        assert_eq!(view.draw(), "     .     2\n");
        assert!(!view.is_dirty());

        view.tile_removed(tile);
        assert_eq!(view.draw(), "     .     .\n");
    }

    #[test]
    fn render_shows_grid_and_controls() {
        let mut terminal = terminal();
        terminal
            .draw(|frame| render(frame, "     .     2\n"))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("2048"));
        assert!(text.contains("     .     2"));
        assert!(text.contains("Controls"));
    }

    #[test]
    fn arrow_keys_play_the_game() {
        use KeyCode::*;
        let events = vec![press(Right), press(Left), press(Left)].into_iter();
        let mut game = Game::new(config(1, 2), create_console(terminal(), events));
        game.run().unwrap();
        // Wherever the first tile lands, the row fills to [2, 2] and merges.
        let values: Vec<u32> = game.board().borrow().to_array().iter().copied().collect();
        assert_eq!(values, vec![4, 2]);
    }

    #[test]
    fn quit_stops_reading_keys() {
        use KeyCode::*;
        let events = vec![press(Char('q')), press(Left), press(Right)].into_iter();
        let mut game = Game::new(config(2, 2), create_console(terminal(), events));
        game.run().unwrap();
        assert_eq!(game.board().borrow().tiles().count(), 1);
    }

    #[test]
    fn console_places_first_tile() {
        let console = create_console(terminal(), std::iter::empty::<io::Result<Event>>());
        let mut game = Game::new(config(3, 3), console);
        game.run().unwrap();
        assert_eq!(game.board().borrow().tiles().count(), 1);
    }

    #[test]
    fn event_error_ends_the_game() {
        let events = vec![Err::<Event, _>(io::Error::new(io::ErrorKind::Other, "closed"))].into_iter();
        let mut game = Game::new(config(2, 2), create_console(terminal(), events));
        assert!(game.run().is_err());
    }
}
