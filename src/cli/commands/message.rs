//! Message command - post a control message to the worker

use crate::cli::args::{MessageArgs, MessageKind};
use crate::cli::WorkerHost;
use crate::error::OffcacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{ControlMessage, WorkerState};

/// Execute the message command
pub async fn execute(args: MessageArgs, host: &WorkerHost) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let (manager, mut registration) = host.resume().await?;

    let message = match args.message {
        MessageKind::SkipWaiting => ControlMessage::SkipWaiting,
    };
    let state = manager.handle_message(message);
    host.persist(&manager, &mut registration).await?;

    ui::step_ok_detail(&ctx, "Message delivered", &format!("worker is {}", state));
    if state == WorkerState::Activating {
        ui::remark(&ctx, "Run: offcache activate");
    }

    Ok(())
}
