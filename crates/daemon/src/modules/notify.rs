//! Notification module: turns interesting events into text notices.
//!
//! The notices go over a channel; rendering them (speech, toast, whatever)
//! is the consumer's concern. Historical dispatch is fully suppressed so a
//! startup replay does not narrate the whole previous session.

use edscout_core::{JournalEvent, galaxy};

use crate::bus::{DispatchMode, JournalModule};
use crate::modules::NoticeSender;

pub struct NotifyModule {
    tx: NoticeSender,
    high_value_threshold: i64,
}

impl NotifyModule {
    pub fn new(tx: NoticeSender, high_value_threshold: i64) -> NotifyModule {
        NotifyModule {
            tx,
            high_value_threshold,
        }
    }

    fn send(&self, text: String) {
        // A closed channel just means nobody is listening.
        let _ = self.tx.send(text);
    }
}

impl JournalModule for NotifyModule {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn handle_event(&mut self, event: &JournalEvent, mode: DispatchMode) -> anyhow::Result<()> {
        if mode == DispatchMode::Historical {
            return Ok(());
        }

        if let Some(system) = event.arrival_system() {
            self.send(format!("Arrived at {system}"));
        } else if let Some(target) = event.hyperspace_target() {
            self.send(format!("Jumping to {target}"));
        } else if let Some(scan) = event.scan() {
            let is_star = scan.is_star();
            let basis = if is_star {
                scan.star_type.as_deref()
            } else {
                scan.planet_class.as_deref()
            }
            .unwrap_or("");
            let value = galaxy::estimate_value(basis, scan.is_terraformable(), is_star);
            if value > self.high_value_threshold {
                self.send(format!(
                    "High value body: {} at about {value} credits",
                    scan.body_name
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn module() -> (NotifyModule, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NotifyModule::new(tx, 1_000_000), rx)
    }

    fn event(line: &str) -> JournalEvent {
        JournalEvent::decode(line).unwrap()
    }

    #[test]
    fn announces_arrival_and_jump_charge() {
        let (mut m, mut rx) = module();
        m.handle_event(
            &event(r#"{"event":"StartJump","JumpType":"Hyperspace","StarSystem":"Sol"}"#),
            DispatchMode::Live,
        )
        .unwrap();
        m.handle_event(
            &event(r#"{"event":"FSDJump","StarSystem":"Sol"}"#),
            DispatchMode::Live,
        )
        .unwrap();
        assert_eq!(rx.try_recv().unwrap(), "Jumping to Sol");
        assert_eq!(rx.try_recv().unwrap(), "Arrived at Sol");
    }

    #[test]
    fn high_value_bodies_only() {
        let (mut m, mut rx) = module();
        m.handle_event(
            &event(
                r#"{"event":"Scan","BodyName":"Sol 3","StarSystem":"Sol","PlanetClass":"Earthlike body"}"#,
            ),
            DispatchMode::Live,
        )
        .unwrap();
        m.handle_event(
            &event(
                r#"{"event":"Scan","BodyName":"Sol 5","StarSystem":"Sol","PlanetClass":"Icy body"}"#,
            ),
            DispatchMode::Live,
        )
        .unwrap();
        let notice = rx.try_recv().unwrap();
        assert!(notice.starts_with("High value body: Sol 3"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn historical_dispatch_is_silent() {
        let (mut m, mut rx) = module();
        m.handle_event(
            &event(r#"{"event":"FSDJump","StarSystem":"Sol"}"#),
            DispatchMode::Historical,
        )
        .unwrap();
        assert!(rx.try_recv().is_err());
    }
}
