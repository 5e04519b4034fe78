//! End-to-end tests of the HUD through its public API, drawing onto a real
//! canvas.

use std::cell::Cell;

use pretty_assertions::assert_eq;

use headsup::error::ConfigError;
use headsup::geo::Point;
use headsup::gfx::texel::ColorRange;
use headsup::gfx::Canvas;
use headsup::hud::layout::HAlign;
use headsup::hud::layout::VAlign;
use headsup::hud::multiline::LineLog;
use headsup::hud::multiline::Multiline;
use headsup::hud::multiline::ViewMode;
use headsup::hud::multiline::WidgetContent;
use headsup::hud::multiline::WidgetFlags;
use headsup::hud::multiline::WidgetFont;
use headsup::hud::responder::Session;
use headsup::hud::HudEngine;
use headsup::hud::TicInput;
use headsup::options::HudOptions;

#[derive(Default)]
struct Player {
  health: u32,
  ammo: u32,
  builds: Cell<u32>,
}

enum Content {
  Title,
  Health,
  Ammo,
  Log,
}

impl WidgetContent for Content {
  type State = Player;

  fn wanted(&self, _: &Player, _: ViewMode) -> bool {
    true
  }

  fn build(&self, p: &Player, lines: &mut LineLog) {
    p.builds.set(p.builds.get() + 1);
    match self {
      Self::Title => lines.add_string_to_cur_line("MAP01: ENTRYWAY"),
      Self::Health => lines.add_string_to_cur_line(&format!("HP {}", p.health)),
      Self::Ammo => lines.add_string_to_cur_line(&format!("AM {}", p.ammo)),
      Self::Log => {
        lines.add_string_to_cur_line("OLD");
        lines.add_string_to_cur_line("NEW");
      }
    }
  }
}

const SCREEN: (i32, i32) = (40, 10);
const STATUS_BAR: i32 = 2;

fn hud() -> HudEngine<Content> {
  let mut hud = HudEngine::new(HudOptions::default(), Content::Title).unwrap();
  let stat = |c| Multiline::new(1, WidgetFont::Stat, ColorRange::Gray).with_content(c);
  hud.register("health", None, stat(Content::Health));
  hud.register("ammo", Some("weapons"), stat(Content::Ammo));
  hud.register(
    "cmd",
    Some("commands"),
    Multiline::new(2, WidgetFont::Mono, ColorRange::Tan)
      .with_content(Content::Log)
      .with_flags(WidgetFlags::BOTTOM_UP),
  );
  hud
}

fn tick(hud: &mut HudEngine<Content>, player: &Player) {
  hud.tick(&TicInput {
    view: ViewMode::default(),
    session: Session::default(),
    chat_chars: [0; 4],
    state: player,
  });
}

fn canvas() -> Canvas {
  Canvas::new(SCREEN.into(), STATUS_BAR)
}

fn rows(canvas: &Canvas) -> Vec<String> {
  (0..SCREEN.1)
    .map(|y| canvas.row_text(y).trim_end().to_string())
    .collect()
}

#[test]
fn layout_resource_places_widgets() {
  let mut hud = hud();
  hud
    .load_layout("HUD 1\nhealth topleft\nammo -10 -10\n", (320, 200).into())
    .unwrap();

  let health = hud.lookup("health").unwrap();
  let ammo = hud.lookup("WEAPONS").unwrap();
  let layouts = hud.layouts();

  let b = layouts.find(1, health).unwrap();
  assert_eq!((b.h_align(), b.v_align()), (HAlign::Left, VAlign::Top));
  let b = layouts.find(1, ammo).unwrap();
  assert_eq!((b.h_align(), b.v_align()), (HAlign::Direct, VAlign::Direct));
  assert_eq!(b.pos(), Point::new(310, 190));

  // The other layouts only have the built-in widgets.
  assert_eq!(layouts.find(0, health), None);
  assert_eq!(layouts.widgets(2).count(), 4);
}

#[test]
fn bad_layout_is_rejected_whole() {
  let mut hud = hud();
  let before = hud.layouts().clone();

  let err = hud
    .load_layout("HUD 0\nhealth topleft\nammo 500 5\n", SCREEN.into())
    .unwrap_err();
  assert!(matches!(err, ConfigError::OutOfBounds { x: 500, y: 5, .. }));
  assert_eq!(hud.layouts(), &before);

  let err = hud.load_layout("armor topleft", SCREEN.into()).unwrap_err();
  assert!(matches!(err, ConfigError::NoLayoutSelected { .. }));
}

#[test]
fn stacked_widgets_draw_where_expected() {
  let mut hud = hud();
  hud
    .load_layout(
      "HUD 2 health bottomleft ammo bottomleft cmd topright",
      SCREEN.into(),
    )
    .unwrap();

  let player = Player {
    health: 87,
    ammo: 12,
    ..Player::default()
  };
  hud.start(&player);
  hud.post_message("HELLO");
  tick(&mut hud, &player);

  let mut canvas = canvas();
  hud.draw(&mut canvas);
  let mut expected = vec![String::new(); SCREEN.1 as usize];
  // The message claims the whole top row, so the right column starts below.
  expected[0] = "HELLO".to_string();
  expected[1] = format!("{:<37}NEW", "");
  expected[2] = format!("{:<37}OLD", "");
  expected[6] = "AM 12".to_string();
  expected[7] = "HP 87".to_string();
  assert_eq!(rows(&canvas), expected);
}

#[test]
fn drawing_never_rebuilds() {
  let mut hud = hud();
  hud.load_layout("HUD 2 health topleft", SCREEN.into()).unwrap();

  let mut player = Player {
    health: 100,
    ..Player::default()
  };
  hud.start(&player);
  tick(&mut hud, &player);
  let builds = player.builds.get();

  let mut first = canvas();
  hud.draw(&mut first);
  player.health = 5;
  let mut second = canvas();
  hud.draw(&mut second);
  hud.draw(&mut second);

  assert_eq!(player.builds.get(), builds);
  assert_eq!(rows(&first), rows(&second));
  assert_eq!(rows(&second)[0], "HP 100");

  tick(&mut hud, &player);
  let mut third = canvas();
  hud.draw(&mut third);
  assert_eq!(rows(&third)[0], "HP 5");
}

#[test]
fn switching_layouts_waits_for_a_tic() {
  let mut hud = hud();
  hud
    .load_layout("HUD 0 health topleft HUD 1 ammo topleft", SCREEN.into())
    .unwrap();

  let player = Player {
    health: 50,
    ammo: 7,
    ..Player::default()
  };
  hud.set_layout(0);
  hud.start(&player);
  tick(&mut hud, &player);

  hud.set_layout(1);
  assert!(hud.is_pending());
  let mut canvas = canvas();
  hud.draw(&mut canvas);
  assert!(rows(&canvas).iter().all(String::is_empty));

  tick(&mut hud, &player);
  hud.draw(&mut canvas);
  assert_eq!(rows(&canvas)[0], "AM 7");
}

#[test]
fn system_messages_preempt_ordinary_ones() {
  let mut hud = hud();
  let player = Player::default();
  hud.start(&player);

  hud.post_system_message("MESSAGES OFF");
  hud.post_message("PICKED UP A CLIP.");
  tick(&mut hud, &player);
  hud.post_message("PICKED UP A SHELL.");
  tick(&mut hud, &player);

  let mut canvas = canvas();
  hud.draw(&mut canvas);
  assert_eq!(rows(&canvas)[0], "MESSAGES OFF");
}

#[test]
fn inline_escapes_color_messages() {
  let mut hud = hud();
  let player = Player::default();
  hud.start(&player);
  hud.post_message("A \x1b6RED\x1b/ KEY");
  tick(&mut hud, &player);

  let mut canvas = canvas();
  hud.draw(&mut canvas);
  assert_eq!(rows(&canvas)[0], "A RED KEY");
  let fg = |x| canvas.get(Point::new(x, 0)).map(|t| t.fg());
  assert_eq!(fg(2), Some(ColorRange::Red.color()));
  assert_eq!(fg(6), Some(ColorRange::None.color()));
}
