use eframe::egui;

/// How long a toast stays on screen.
pub const ALERT_DWELL_SECONDS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    fn accent(self) -> egui::Color32 {
        match self {
            Severity::Success => egui::Color32::from_rgb(60, 160, 90),
            Severity::Info => egui::Color32::from_rgb(70, 130, 200),
            Severity::Warning => {
                egui::Color32::from_rgb(210, 160, 50)
            }
            Severity::Error => egui::Color32::from_rgb(190, 70, 70),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
    raised_at: f64,
}

/// Transient, auto-dismissing notifications. Alerts stack without a
/// cap and each expires independently after its own dwell.
#[derive(Debug, Clone, Default)]
pub struct Alerts {
    entries: Vec<Alert>,
    clock: f64,
}

impl Alerts {
    pub fn push(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
    ) {
        self.entries.push(Alert {
            message: message.into(),
            severity,
            raised_at: self.clock,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Advance the clock and drop every alert past its dwell.
    pub fn tick(&mut self, now: f64) {
        self.clock = now;
        self.entries.retain(|alert| {
            now - alert.raised_at < ALERT_DWELL_SECONDS
        });
    }

    pub fn entries(&self) -> &[Alert] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Overlay the active alerts in the bottom-right corner, newest at
/// the bottom.
pub fn draw(ctx: &egui::Context, alerts: &Alerts) {
    if alerts.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("alert_overlay"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for alert in alerts.entries() {
                egui::Frame::window(ui.style())
                    .stroke(egui::Stroke::new(
                        1.5,
                        alert.severity.accent(),
                    ))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(&alert.message)
                                .color(alert.severity.accent()),
                        );
                    });
                ui.add_space(4.0);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_expire_after_dwell() {
        let mut alerts = Alerts::default();
        alerts.tick(0.0);
        alerts.error("first");

        alerts.tick(1.0);
        alerts.warning("second");
        assert_eq!(alerts.entries().len(), 2);

        // First alert was raised at t=0 and expires at t=4.
        alerts.tick(4.5);
        assert_eq!(alerts.entries().len(), 1);
        assert_eq!(alerts.entries()[0].message, "second");

        alerts.tick(5.5);
        assert!(alerts.is_empty());
    }

    #[test]
    fn alerts_stack_without_cap() {
        let mut alerts = Alerts::default();
        for i in 0..50 {
            alerts.info(format!("alert {i}"));
        }
        assert_eq!(alerts.entries().len(), 50);
    }
}
