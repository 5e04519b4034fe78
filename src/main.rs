//! A terminal demo of the HUD.
//!
//! A few players share an empty arena. The console player walks around with
//! the arrow keys, picking things up and finding secrets; the others are bots
//! that wander and chat. Keys:
//!
//! - arrows: move
//! - `t`: chat to everyone; `g`/`i`/`b`/`r`: chat to one player
//! - Enter: review the last message
//! - Tab: automap
//! - `f`: full-screen view (hides the status bar)
//! - F1-F3: HUD layout
//! - `m`: messages on/off
//! - `c`/`p`: cycle where the coordinates/FPS widgets show
//! - `o`: render stats
//! - `k`: command history
//! - F10 or Ctrl-C: quit

#![deny(unused)]
#![deny(warnings)]

use std::collections::VecDeque;
use std::fs;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use legion::world::SubWorld;
use legion::IntoQuery as _;
use legion::Resources;
use legion::Schedule;
use legion::World;
use rand::rngs::StdRng;
use rand::Rng as _;
use rand::SeedableRng as _;

use headsup::geo::center_offset;
use headsup::geo::Point;
use headsup::geo::Rect;
use headsup::gfx;
use headsup::gfx::texel::colors;
use headsup::gfx::texel::ColorRange;
use headsup::gfx::texel::Texel;
use headsup::gfx::Canvas;
use headsup::hud::chat;
use headsup::hud::chat::MAX_PLAYERS;
use headsup::hud::markup::Styled;
use headsup::hud::multiline::LineLog;
use headsup::hud::multiline::Multiline;
use headsup::hud::multiline::Show;
use headsup::hud::multiline::ViewMode;
use headsup::hud::multiline::WidgetContent;
use headsup::hud::multiline::WidgetFlags;
use headsup::hud::multiline::WidgetFont;
use headsup::hud::responder::Session;
use headsup::hud::Cue;
use headsup::hud::HudEngine;
use headsup::hud::Surface as _;
use headsup::hud::TicInput;
use headsup::input;
use headsup::input::KeyCode;
use headsup::input::KeyModifiers;
use headsup::options::HudOptions;
use headsup::timing::FrameTimer;
use headsup::timing::SystemTimer;
use headsup::timing::TicClock;
use headsup::timing::TICRATE;

/// The layouts used when no layout file is given.
const DEFAULT_LAYOUT: &str = "
// Bare: just the essentials.
HUD 0
health  bottomleft
ammo    bottomright

// Compact.
HUD 1
health  bottomleft
armor   bottomleft
ammo    bottomright
weapon  bottomright
stats   topright
time    topright

// Everything.
HUD 2
health  bottomleft
armor   bottomleft
ammo    bottomright
weapons bottomright
monsec  topright
sttime  topright
coords  topright
fps     topright
rate    topleft
cmd     bottomcenter
";

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(version, about = "Heads-up display demo")]
struct Args {
  /// HUD options file; a missing file means defaults.
  #[arg(long, default_value = "headsup.toml")]
  options: PathBuf,

  /// HUD layout file; the built-in layouts are used if not given.
  #[arg(long)]
  layout: Option<PathBuf>,

  /// Number of players, including you.
  #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
  players: u8,

  /// Where to write the log; the terminal belongs to the demo.
  #[arg(long, default_value = "headsup.log")]
  log: PathBuf,

  /// Seed for the bots.
  #[arg(long)]
  seed: Option<u64>,
}

/// Component: which player slot an entity is.
struct Slot(usize);

/// Component: marks the console player.
struct Console;

/// Component: where a player stands.
struct Position(Point);

/// Component: a player's health, armor and ammo.
struct Vitals {
  health: i32,
  armor: i32,
  ammo: i32,
  weapons: [bool; 7],
}

impl Vitals {
  fn new() -> Self {
    Self {
      health: 100,
      armor: 0,
      ammo: 50,
      weapons: [true, true, false, false, false, false, false],
    }
  }
}

const TAUNTS: &[&str] = &[
  "hi",
  "gg",
  "behind you!",
  "who has the blue key?",
  "nice shot",
  "brb",
];

/// Component: a remote player driven by the computer.
struct Bot {
  rng: StdRng,
  outbox: VecDeque<u8>,
}

impl Bot {
  fn new(seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
      outbox: VecDeque::new(),
    }
  }

  /// Returns this tic's chat character, occasionally starting a new line.
  fn next_char(&mut self, console: usize) -> u8 {
    if self.outbox.is_empty() && self.rng.gen_ratio(1, 8 * TICRATE) {
      let dest = if self.rng.gen_bool(0.5) {
        chat::BROADCAST
      } else {
        console as u8 + 1
      };
      let taunt = TAUNTS[self.rng.gen_range(0..TAUNTS.len())];
      self.outbox.push_back(dest);
      self.outbox.extend(taunt.bytes());
      self.outbox.push_back(chat::KEY_ENTER);
    }
    self.outbox.pop_front().unwrap_or(0)
  }

  fn wander(&mut self, pos: &mut Point, bounds: Rect) {
    if !self.rng.gen_ratio(1, 10) {
      return;
    }
    let step = Point::new(self.rng.gen_range(-1..=1), self.rng.gen_range(-1..=1));
    if bounds.contains(*pos + step) {
      *pos += step;
    }
  }
}

#[derive(Copy, Clone, Debug)]
enum Item {
  Stimpack,
  Clip,
  ArmorBonus,
  Shotgun,
  BlueKey,
}

impl Item {
  fn pick_up(self, vitals: &mut Vitals) -> &'static str {
    match self {
      Self::Stimpack => {
        vitals.health = (vitals.health + 10).min(100);
        "Picked up a stimpack."
      }
      Self::Clip => {
        vitals.ammo = (vitals.ammo + 10).min(200);
        "Picked up a clip."
      }
      Self::ArmorBonus => {
        vitals.armor = (vitals.armor + 1).min(200);
        "Picked up an armor bonus."
      }
      Self::Shotgun => {
        vitals.weapons[2] = true;
        vitals.ammo = (vitals.ammo + 8).min(200);
        "You got the shotgun!"
      }
      Self::BlueKey => "Picked up a blue keycard.",
    }
  }
}

/// The arena and everything lying in it.
struct Arena {
  bounds: Rect,
  items: Vec<(Point, Item)>,
  secrets: Vec<Point>,
}

impl Arena {
  fn new(rng: &mut StdRng) -> Self {
    let bounds = Rect::with_dims(60, 18);
    let mut spot = || {
      Point::new(
        rng.gen_range(1..bounds.width() - 1),
        rng.gen_range(1..bounds.height() - 1),
      )
    };
    let kinds = [
      Item::Stimpack,
      Item::Clip,
      Item::ArmorBonus,
      Item::ArmorBonus,
      Item::Shotgun,
      Item::BlueKey,
      Item::Clip,
    ];
    let items = kinds.iter().map(|&k| (spot(), k)).collect();
    let secrets = (0..3).map(|_| spot()).collect();
    Self {
      bounds,
      items,
      secrets,
    }
  }
}

/// Everything stat widgets are built from.
#[derive(Default)]
struct GameState {
  level: String,
  health: i32,
  armor: i32,
  ammo: i32,
  weapons: [bool; 7],
  items: (usize, usize),
  secrets: (usize, usize),
  tics: u64,
  pos: Point,

  fps: f64,
  timings: Vec<(&'static str, Duration)>,
  cmds: VecDeque<String>,

  show_coords: Show,
  show_fps: Show,
  show_rate: bool,
  show_cmds: bool,
}

const CMD_HISTORY: usize = 6;

impl GameState {
  fn log_cmd(&mut self, cmd: String) {
    if self.cmds.len() == CMD_HISTORY {
      self.cmds.pop_front();
    }
    self.cmds.push_back(cmd);
  }
}

/// The demo's stat widgets.
enum Stat {
  Title,
  Health,
  Armor,
  Ammo,
  Weapons,
  Monsec,
  Time,
  Coords,
  Fps,
  Rate,
  Cmds,
}

fn threshold(value: i32, low: i32, mid: i32, high: i32) -> ColorRange {
  if value < low {
    ColorRange::Red
  } else if value < mid {
    ColorRange::Gold
  } else if value <= high {
    ColorRange::Green
  } else {
    ColorRange::Blue2
  }
}

fn fraction(styled: Styled, label: &str, (have, total): (usize, usize)) -> Styled {
  let color = if have == total {
    ColorRange::Blue2
  } else {
    ColorRange::Gray
  };
  styled
    .colored(label, ColorRange::Red)
    .colored(format!("{}/{} ", have, total), color)
}

impl WidgetContent for Stat {
  type State = GameState;

  fn wanted(&self, s: &GameState, view: ViewMode) -> bool {
    match self {
      // The engine shows the title on its own.
      Self::Title => false,
      Self::Health | Self::Armor | Self::Ammo | Self::Weapons => {
        view.fullscreen
      }
      Self::Monsec => view.automap || view.fullscreen,
      Self::Time => Show::AUTOMAP.applies(view),
      Self::Coords => s.show_coords.applies(view),
      Self::Fps => s.show_fps.applies(view),
      Self::Rate => s.show_rate,
      Self::Cmds => s.show_cmds && !s.cmds.is_empty(),
    }
  }

  fn build(&self, s: &GameState, lines: &mut LineLog) {
    match self {
      Self::Title => lines.add_string_to_cur_line(&s.level),
      Self::Health => lines.add_styled(
        &Styled::new()
          .text("HEALTH ")
          .colored(format!("{}%", s.health), threshold(s.health, 25, 50, 100)),
      ),
      Self::Armor => lines.add_styled(
        &Styled::new()
          .text("ARMOR ")
          .colored(format!("{}%", s.armor), threshold(s.armor, 25, 50, 100)),
      ),
      Self::Ammo => lines.add_styled(
        &Styled::new()
          .text("AMMO ")
          .colored(format!("{}/200", s.ammo), threshold(s.ammo, 10, 50, 200)),
      ),
      Self::Weapons => {
        let mut styled = Styled::new().text("WEAPONS");
        for (i, &owned) in s.weapons.iter().enumerate() {
          let color = if owned {
            ColorRange::Gold
          } else {
            ColorRange::Black
          };
          styled = styled.colored(format!(" {}", i + 1), color);
        }
        lines.add_styled(&styled);
      }
      Self::Monsec => {
        let styled = fraction(Styled::new(), "I ", s.items);
        lines.add_styled(&fraction(styled, "S ", s.secrets));
      }
      Self::Time => {
        let secs = s.tics / TICRATE as u64;
        lines.add_string_to_cur_line(&format!("TIME {}:{:02}", secs / 60, secs % 60));
      }
      Self::Coords => lines.add_styled(
        &Styled::new()
          .colored("X ", ColorRange::Gold)
          .text(s.pos.x().to_string())
          .colored(" Y ", ColorRange::Gold)
          .text(s.pos.y().to_string()),
      ),
      Self::Fps => lines.add_string_to_cur_line(&format!("FPS {:.1}", s.fps)),
      Self::Rate => {
        for (tag, d) in &s.timings {
          lines.add_string_to_cur_line(&format!(
            "{:<24}{:>8.3}ms",
            tag,
            d.as_secs_f64() * 1000.0
          ));
        }
      }
      Self::Cmds => {
        for cmd in &s.cmds {
          lines.add_string_to_cur_line(cmd);
        }
      }
    }
  }
}

/// Registers the demo's stat widgets with the HUD.
fn register_widgets(hud: &mut HudEngine<Stat>) {
  let stat = |content| {
    Multiline::new(1, WidgetFont::Stat, ColorRange::Gray).with_content(content)
  };
  hud.register("health", None, stat(Stat::Health));
  hud.register("armor", None, stat(Stat::Armor));
  hud.register("ammo", None, stat(Stat::Ammo));
  hud.register("weapon", Some("weapons"), stat(Stat::Weapons));
  hud.register("monsec", Some("stats"), stat(Stat::Monsec));
  hud.register("sttime", Some("time"), stat(Stat::Time));
  hud.register("coord", Some("coords"), stat(Stat::Coords));
  hud.register("fps", None, stat(Stat::Fps));
  hud.register(
    "rate",
    Some("render_stats"),
    Multiline::new(8, WidgetFont::Mono, ColorRange::Gray)
      .with_content(Stat::Rate)
      .with_flags(WidgetFlags::EXCLUSIVE),
  );
  hud.register(
    "cmd",
    Some("commands"),
    Multiline::new(CMD_HISTORY, WidgetFont::Mono, ColorRange::Tan)
      .with_content(Stat::Cmds)
      .with_flags(WidgetFlags::BOTTOM_UP),
  );
}

/// Game-wide state, shared by the systems.
struct Game {
  state: GameState,
  view: ViewMode,
  session: Session,
  arena: Arena,
  step: Point,
}

const PLAYER_COLORS: [ColorRange; MAX_PLAYERS] = [
  ColorRange::Green,
  ColorRange::Blue1,
  ColorRange::Brown,
  ColorRange::Red,
];

fn next_show(show: Show) -> Show {
  if show == Show::empty() {
    Show::HUD
  } else if show == Show::HUD {
    Show::AUTOMAP
  } else if show == Show::AUTOMAP {
    Show::ALWAYS
  } else {
    Show::empty()
  }
}

impl Game {
  /// Runs one simulation tic.
  fn tic(&mut self, world: &mut SubWorld, hud: &mut HudEngine<Stat>) {
    let console = self.session.console_player;
    let step = std::mem::replace(&mut self.step, Point::zero());

    let mut query = <(&mut Position, &mut Vitals)>::query()
      .filter(legion::component::<Console>());
    for (Position(pos), vitals) in query.iter_mut(world) {
      if self.arena.bounds.contains(*pos + step) {
        *pos += step;
      }

      let here = *pos;
      if let Some(i) = self.arena.items.iter().position(|(p, _)| *p == here) {
        let (_, item) = self.arena.items.remove(i);
        hud.post_message(item.pick_up(vitals));
        self.state.items.0 += 1;
      }
      if let Some(i) = self.arena.secrets.iter().position(|p| *p == here) {
        self.arena.secrets.remove(i);
        self.state.secrets.0 += 1;
        hud.reveal_secret("A secret is revealed!");
      }

      self.state.health = vitals.health;
      self.state.armor = vitals.armor;
      self.state.ammo = vitals.ammo;
      self.state.weapons = vitals.weapons;
      self.state.pos = here;
    }

    // Nobody is listening on the other end of the wire.
    if let Some(c) = hud.dequeue_chat_char() {
      log::trace!("sent chat byte {:#04x}", c);
    }

    let mut chat_chars = [0; MAX_PLAYERS];
    let mut bots = <(&Slot, &mut Bot, &mut Position)>::query();
    for (Slot(slot), bot, Position(pos)) in bots.iter_mut(world) {
      bot.wander(pos, self.arena.bounds);
      chat_chars[*slot] = bot.next_char(console);
    }

    self.state.tics += 1;
    let cues = hud.tick(&TicInput {
      view: self.view,
      session: self.session,
      chat_chars,
      state: &self.state,
    });
    for cue in cues {
      match cue {
        Cue::ChatReceived { from } => {
          log::info!("*chat sound* from player {}", from)
        }
      }
    }
  }

  /// Paints the game view and status bar behind the HUD.
  fn paint(&self, canvas: &mut Canvas, view: ViewMode, players: &[(usize, Point)]) {
    let area = if view.fullscreen {
      canvas.dims()
    } else {
      canvas.view_area()
    };
    let bounds = self.arena.bounds;
    let origin = area.upper_left()
      + Point::new(
        center_offset(area.width(), bounds.width()),
        center_offset(area.height(), bounds.height()),
      );

    if view.automap {
      let border = Texel::new('#').with_fg(colors::DIMGRAY);
      let outer = Rect::new(
        origin - Point::new(1, 1),
        origin + bounds.lower_right() + Point::new(1, 1),
      );
      canvas.fill(outer, border);
      canvas.fill(Rect::new(origin, origin + bounds.lower_right()), Texel::empty());
    } else {
      canvas.fill(
        Rect::new(origin, origin + bounds.lower_right()),
        Texel::new('.').with_fg(colors::DIMGRAY),
      );
    }

    for &(p, _) in &self.arena.items {
      canvas.put_str(origin + p, "*", Texel::empty().with_fg(colors::GOLD));
    }
    for &(slot, p) in players {
      let glyph = if view.automap {
        (b'1' + slot as u8) as char
      } else {
        '@'
      };
      let fg = PLAYER_COLORS[slot % MAX_PLAYERS].color();
      canvas.put_str(origin + p, &glyph.to_string(), Texel::empty().with_fg(fg));
    }

    if !view.fullscreen {
      let bar = canvas.status_bar_area();
      canvas.fill(bar, Texel::new(' ').with_bg(colors::DIMGRAY));
      let s = &self.state;
      canvas.put_str(
        bar.upper_left(),
        &format!(
          " HEALTH {:>3}%   ARMOR {:>3}%   AMMO {:>3}",
          s.health, s.armor, s.ammo
        ),
        Texel::empty().with_fg(colors::WHITE).with_bg(colors::DIMGRAY),
      );
    }
  }
}

#[legion::system]
fn quit(
  #[resource] input: &input::UserInput,
  #[resource] window: &mut gfx::Curses,
) {
  let ctrl_c = input.has_key(KeyCode::Char('c'))
    && input.has_mod(KeyModifiers::CONTROL);
  if ctrl_c || input.has_key(KeyCode::F(10)) {
    log::info!("quitting");
    window.die(0);
  }
}

#[legion::system]
fn respond(
  #[resource] input: &input::UserInput,
  #[resource] hud: &mut HudEngine<Stat>,
  #[resource] game: &mut Game,
  #[resource] timer: &SystemTimer,
) {
  use headsup::hud::responder::KeyState;
  let _t = timer.start("respond()");

  for key in input.events() {
    // Chat gets first pick; it eats printable keys while it is open.
    if hud.respond(key, &game.session) || key.state != KeyState::Down {
      continue;
    }

    let step = match key.code {
      KeyCode::Left => Point::new(-1, 0),
      KeyCode::Right => Point::new(1, 0),
      KeyCode::Up => Point::new(0, -1),
      KeyCode::Down => Point::new(0, 1),
      _ => Point::zero(),
    };
    if step != Point::zero() {
      game.step = step;
      game.state.log_cmd(format!("MOVE {:+} {:+}", step.x(), step.y()));
      continue;
    }

    let s = &mut game.state;
    match key.code {
      KeyCode::Tab => game.view.automap = !game.view.automap,
      KeyCode::Char('f') => game.view.fullscreen = !game.view.fullscreen,
      KeyCode::F(n @ 1..=3) => {
        hud.set_layout(n as usize - 1);
        hud.post_message(&format!("HUD layout {}", n));
      }
      KeyCode::Char('m') => {
        let mut options = hud.options().clone();
        options.show_messages = !options.show_messages;
        let on = options.show_messages;
        hud.set_options(options);
        hud.post_system_message(if on { "Messages ON" } else { "Messages OFF" });
      }
      KeyCode::Char('c') => s.show_coords = next_show(s.show_coords),
      KeyCode::Char('p') => s.show_fps = next_show(s.show_fps),
      KeyCode::Char('o') => s.show_rate = !s.show_rate,
      KeyCode::Char('k') => s.show_cmds = !s.show_cmds,
      _ => continue,
    }
    game.state.log_cmd(format!("{:?}", key.code).to_uppercase());
  }
}

#[legion::system]
#[write_component(Position)]
#[write_component(Vitals)]
#[write_component(Bot)]
#[read_component(Slot)]
#[read_component(Console)]
fn run_tics(
  world: &mut SubWorld,
  #[resource] clock: &mut TicClock,
  #[resource] game: &mut Game,
  #[resource] hud: &mut HudEngine<Stat>,
  #[resource] timer: &SystemTimer,
) {
  let _t = timer.start("hud::tick()");
  for _ in 0..clock.tics_due() {
    game.tic(world, hud);
  }
}

#[legion::system]
#[read_component(Slot)]
#[read_component(Position)]
fn render(
  world: &SubWorld,
  #[resource] game: &mut Game,
  #[resource] hud: &HudEngine<Stat>,
  #[resource] canvas: &mut Canvas,
  #[resource] window: &mut gfx::Curses,
  #[resource] frame_timer: &mut FrameTimer,
  #[resource] timer: &SystemTimer,
) {
  let t = timer.start("render()");
  match gfx::curses::dims() {
    Ok(size) => canvas.resize(size),
    Err(e) => log::warn!("failed to read the terminal size: {}", e),
  }
  canvas.blank();

  let players: Vec<(usize, Point)> = <(&Slot, &Position)>::query()
    .iter(world)
    .map(|(Slot(slot), Position(p))| (*slot, *p))
    .collect();
  game.paint(canvas, hud.view(), &players);
  {
    let _t = timer.start("hud::draw()");
    hud.draw(canvas);
  }
  drop(t);

  let _t = timer.start("curses::present()");
  if let Err(e) = window.present(canvas) {
    log::error!("failed to draw: {}", e);
  }

  let interval = Duration::from_millis(500);
  game.state.fps = frame_timer.measure_fps(interval);
  game.state.timings = timer.averages(interval);
  frame_timer.end_frame(60);
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let log = File::create(&args.log)
    .with_context(|| format!("failed to create log file {:?}", args.log))?;
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    .target(env_logger::Target::Pipe(Box::new(log)))
    .format_timestamp_millis()
    .init();

  let options = HudOptions::load(&args.options)?;
  let layout = match &args.layout {
    Some(path) => fs::read_to_string(path)
      .with_context(|| format!("failed to read layout file {:?}", path))?,
    None => DEFAULT_LAYOUT.to_string(),
  };

  let mut rng = match args.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  let players = args.players as usize;
  let mut session = Session {
    netgame: players > 1,
    ..Session::default()
  };
  let mut world = World::default();
  let arena = Arena::new(&mut rng);
  for slot in 0..players {
    session.in_game[slot] = true;
    let start = Point::new(2 + 4 * slot as i32, 2);
    if slot == session.console_player {
      world.push((Slot(slot), Console, Position(start), Vitals::new()));
    } else {
      world.push((Slot(slot), Bot::new(rng.gen()), Position(start), Vitals::new()));
    }
  }

  let state = GameState {
    level: "E1M1: Hangar".to_string(),
    health: 100,
    ammo: 50,
    items: (0, arena.items.len()),
    secrets: (0, arena.secrets.len()),
    ..GameState::default()
  };

  let mut hud = HudEngine::new(options, Stat::Title)?;
  register_widgets(&mut hud);

  let window = gfx::Curses::init()?;
  let screen = gfx::curses::dims()?;
  let canvas = Canvas::new(screen, 2);
  let layout_error = hud.load_layout(&layout, canvas.size()).err();
  if let Some(e) = &layout_error {
    log::error!("bad HUD layout: {}", e);
  }
  hud.start(&state);
  if let Some(e) = layout_error {
    hud.post_system_message(&e.to_string());
  }

  let mut resources = Resources::default();
  resources.insert(window);
  resources.insert(canvas);
  resources.insert(FrameTimer::new());
  resources.insert(SystemTimer::new());
  resources.insert(TicClock::new());
  resources.insert(input::UserInput::new());
  resources.insert(hud);
  resources.insert(Game {
    state,
    view: ViewMode::default(),
    session,
    arena,
    step: Point::zero(),
  });

  let mut schedule = Schedule::builder()
    .add_system(input::start_frame_system())
    .add_system(quit_system())
    .add_system(respond_system())
    .flush()
    .add_system(run_tics_system())
    .flush()
    .add_system(render_system())
    .build();

  loop {
    schedule.execute(&mut world, &mut resources);
  }
}
