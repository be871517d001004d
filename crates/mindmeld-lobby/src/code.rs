//! Lobby code generation.

use mindmeld_protocol::LobbyCode;
use rand::Rng;

/// Produces codes for new lobbies.
///
/// Codes are assumed unique. The registry overwrites on collision rather
/// than retrying; with 36^6 (about 2.2 billion) codes and a six-hour
/// retention window that is an accepted risk.
pub trait CodeGenerator: Send + Sync + 'static {
    fn generate(&self) -> LobbyCode;
}

/// Random upper-case base-36 codes (`0-9A-Z`).
#[derive(Debug, Clone, Copy)]
pub struct RandomCodes {
    length: usize,
}

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const CODE_LENGTH: usize = 6;

impl Default for RandomCodes {
    fn default() -> Self {
        Self {
            length: CODE_LENGTH,
        }
    }
}

impl CodeGenerator for RandomCodes {
    fn generate(&self) -> LobbyCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        LobbyCode::new(code)
    }
}
