use anyhow::Result;
use tracing::warn;
use tui::{backend::Backend, Terminal};

use crate::submission::{sink::SubmissionSink, FormSubmission};
use crate::ui::proforma_form::{
    ProformaFormAction, ProformaFormState, render_proforma_form, handle_input,
};

/// How a form session ended
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Submitted,
    Cancelled,
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ProformaFormState,
    sink: &mut dyn SubmissionSink,
) -> Result<Outcome> {
    loop {
        terminal.draw(|f| render_proforma_form(f, state))?;

        match handle_input(state)? {
            Some(ProformaFormAction::Cancel) => return Ok(Outcome::Cancelled),
            Some(ProformaFormAction::Submit(submission)) => {
                if deliver(state, sink, &submission) {
                    return Ok(Outcome::Submitted);
                }
            }
            None => {}
        }
    }
}

/// Hand the submission to the sink; on failure the form stays open with
/// the error in the alert popup.
pub fn deliver(
    state: &mut ProformaFormState,
    sink: &mut dyn SubmissionSink,
    submission: &FormSubmission,
) -> bool {
    match sink.deliver(submission) {
        Ok(()) => true,
        Err(err) => {
            warn!("delivery failed: {:#}", err);
            state.show_error(format!("No se pudo enviar: {}", err));
            false
        }
    }
}
