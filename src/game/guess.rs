use std::fmt;

/// Why a guess was refused without touching the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    AlreadyGuessed,
    GameCompleted,
    IncompleteSelection,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectReason::Empty => "Please enter a guess",
            RejectReason::AlreadyGuessed => "You already guessed that!",
            RejectReason::GameCompleted => "This game is already over",
            RejectReason::IncompleteSelection => "Select exactly four items",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome<T> {
    Accepted(T),
    Rejected(RejectReason),
}

impl<T> GuessOutcome<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            GuessOutcome::Accepted(value) => Some(value),
            GuessOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            GuessOutcome::Accepted(_) => None,
            GuessOutcome::Rejected(reason) => Some(*reason),
        }
    }
}

/// Case-insensitive, whitespace-trimmed form used for every comparison.
pub fn normalize_guess(guess: &str) -> String {
    guess.trim().to_lowercase()
}

pub fn guess_matches(guess: &str, answer: &str) -> bool {
    normalize_guess(guess) == normalize_guess(answer)
}

pub fn is_duplicate<'a>(guess: &str, previous: impl IntoIterator<Item = &'a String>) -> bool {
    let guess = normalize_guess(guess);
    previous
        .into_iter()
        .any(|previous| normalize_guess(previous) == guess)
}
