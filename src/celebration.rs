use rand::{seq::SliceRandom, Rng};

/// Animation length in ticks of the event loop
pub const CELEBRATION_TICKS: u32 = 30;

/// Simulated seconds per tick
const DT: f64 = 0.1;

const GRAVITY: f64 = 15.0;

const CHEERS: [&str; 4] = ["PARABÉNS!", "MUITO BEM!", "ÓTIMO!", "CONSEGUIU!"];

const CONFETTI: [char; 6] = ['✨', '🎉', '⭐', '🌟', '✓', '🎊'];

/// One symbol flying across the screen
#[derive(Debug, Clone, PartialEq)]
pub struct Confetti {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    /// letters settle on `target` to spell the cheer; loose confetti falls
    pub target: Option<(f64, f64)>,
}

impl Confetti {
    fn loose<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *CONFETTI.choose(rng).unwrap_or(&'✨'),
            color_index: rng.gen_range(0..7),
            target: None,
        }
    }

    fn letter(from: (f64, f64), to: (f64, f64), symbol: char, color_index: usize) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index,
            target: Some(to),
        }
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }

    fn step(&mut self, dt: f64) {
        match self.target {
            Some((tx, ty)) => {
                if ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt() > 1.0 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                    self.vel_x *= 0.95;
                    self.vel_y *= 0.95;
                } else {
                    self.x = tx;
                    self.y = ty;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }
    }
}

/// Short burst played when a learner finishes a track
#[derive(Debug, Default)]
pub struct Celebration {
    pub confetti: Vec<Confetti>,
    pub cheer: &'static str,
    ticks_left: u32,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.ticks_left > 0
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        self.start_with(width, height, &mut rng);
    }

    pub fn start_with<R: Rng>(&mut self, width: u16, height: u16, rng: &mut R) {
        self.confetti.clear();
        self.ticks_left = CELEBRATION_TICKS;
        self.width = width as f64;
        self.height = height as f64;
        self.cheer = CHEERS.choose(rng).copied().unwrap_or(CHEERS[0]);

        let center = (self.width / 2.0, self.height / 2.0);
        let spacing = 2.0;
        let letters = self.cheer.chars().count() as f64;
        let left = center.0 - (letters - 1.0) * spacing / 2.0;

        for (i, ch) in self.cheer.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let from = (
                center.0 + rng.gen_range(-10.0..10.0),
                center.1 + rng.gen_range(-5.0..5.0),
            );
            let to = (left + i as f64 * spacing, center.1 - 2.0);
            let color = rng.gen_range(0..7);
            self.confetti.push(Confetti::letter(from, to, ch, color));
        }

        for _ in 0..25 {
            let x = center.0 + rng.gen_range(-15.0..15.0);
            let y = center.1 + rng.gen_range(-8.0..8.0);
            self.confetti.push(Confetti::loose(x, y, rng));
        }
    }

    /// Advance one tick; loose confetti that leaves the screen is dropped.
    pub fn on_tick(&mut self) {
        if !self.is_active() {
            return;
        }
        self.ticks_left -= 1;
        if self.ticks_left == 0 {
            self.confetti.clear();
            return;
        }

        let margin = 5.0;
        let (width, height) = (self.width, self.height);
        self.confetti.retain_mut(|c| {
            c.step(DT);
            c.is_letter() || (c.y <= height + margin && c.x >= -margin && c.x <= width + margin)
        });
    }

    pub fn stop(&mut self) {
        self.ticks_left = 0;
        self.confetti.clear();
    }
}
