//! LLM-backed move provider.

use super::{MoveProvider, ProviderError};
use crate::llm_client::LlmClient;
use strictly_reversi::{Board, Player, Position, rules};
use tracing::{debug, info, instrument, warn};

const SYSTEM_PROMPT: &str = "You are an expert Reversi (Othello) player. \
Prioritize corners, stability and mobility. \
Reply with only a JSON object of the form {\"row\": number, \"col\": number}.";

/// Asks a language model for the move.
///
/// The model sees the board and the legal moves; its answer is parsed but
/// not checked for legality here.
pub struct LlmMoveProvider {
    name: String,
    client: LlmClient,
}

impl LlmMoveProvider {
    /// Creates a new LLM move provider.
    pub fn new(name: impl Into<String>, client: LlmClient) -> Self {
        let name = name.into();
        info!(agent = %name, model = %client.config().model(), "Creating LLM move provider");
        Self { name, client }
    }
}

/// Builds the user prompt for one move.
pub fn move_prompt(board: &Board, player: Player) -> String {
    let moves = rules::legal_moves(board, player);
    let moves_json = serde_json::to_string(&moves).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Current board (B=Black, W=White, .=Empty), rows top to bottom:\n{}\n\n\
         You are playing as {}.\n\
         Available valid moves (row, col), 0-indexed:\n{}\n\n\
         Return the JSON object of the best move: {{\"row\": number, \"col\": number}}.",
        board.display(),
        player,
        moves_json
    )
}

/// Extracts a `{"row": r, "col": c}` object from model output.
///
/// Tolerates surrounding prose or code fences by taking the outermost
/// braces.
pub fn parse_move(text: &str) -> Result<Position, ProviderError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(ProviderError::Unparseable(text.trim().to_string())),
    };
    serde_json::from_str::<Position>(json)
        .map_err(|e| ProviderError::Unparseable(format!("{}: {}", e, json)))
}

#[async_trait::async_trait]
impl MoveProvider for LlmMoveProvider {
    #[instrument(skip(self, board), fields(agent = %self.name))]
    async fn request_move(&self, board: &Board, player: Player) -> Result<Position, ProviderError> {
        let prompt = move_prompt(board, player);
        debug!(prompt_length = prompt.len(), "Asking model for a move");

        let reply = self.client.generate(SYSTEM_PROMPT, &prompt).await.map_err(|e| {
            warn!(error = %e, "Model request failed");
            ProviderError::Rejected(e.message)
        })?;

        let position = parse_move(&reply)?;
        debug!(%position, "Model chose a move");
        Ok(position)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
