use crate::{BoardState, Msg};

/// Pure update function: applies a message to the board and returns the new board.
pub fn update(mut state: BoardState, msg: Msg) -> BoardState {
    match msg {
        Msg::RunStarted => state.start_run(),
        Msg::JobCreated(job) => state.insert_job(job),
        Msg::JobUpdated { job_id, update } => {
            // Updates after a terminal state are dropped, never merged.
            state.apply_update(job_id, update);
        }
        Msg::RunFinished => state.finish_run(),
    }

    state
}
