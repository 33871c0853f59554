use shared::math::Vec2;
use shared::protocol::Message;

///One sampled input: where to move and which buttons are down.
pub struct Intent {
    pub move_vector: Vec2,
    pub attack: bool,
    pub interact: bool,
}

impl Intent {
    pub fn to_message(&self) -> Message {
        Message::PlayerInput {
            move_vector: self.move_vector,
            attack: self.attack,
            interact: self.interact,
        }
    }
}

///Input source for a headless client. `Still` parks the player; `Wander`
///walks a slowly turning heading so the mirror world has something to show.
pub enum Controller {
    Still,
    Wander { elapsed: f32 },
}

impl Controller {
    pub fn wander() -> Controller {
        Controller::Wander { elapsed: 0.0 }
    }

    pub fn sample(&mut self, dt: f32) -> Intent {
        match self {
            Controller::Still => Intent {
                move_vector: Vec2::ZERO,
                attack: false,
                interact: false,
            },
            Controller::Wander { elapsed } => {
                *elapsed += dt;
                let heading = *elapsed * 0.25;
                Intent {
                    move_vector: Vec2::new(heading.cos(), heading.sin()),
                    attack: false,
                    interact: false,
                }
            }
        }
    }
}
