use super::AppModel;

impl AppModel {
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn note_refresh_success(&mut self, generation: u64, errors: usize) {
        if errors == 0 {
            self.set_status_message(format!("refresh #{generation} done"));
        } else {
            self.set_status_message(format!(
                "refresh #{generation} done with {errors} error{} (e to view)",
                if errors == 1 { "" } else { "s" }
            ));
        }
    }

    pub fn note_refresh_error(&mut self, message: impl Into<String>) {
        self.set_status_message(message);
    }
}
