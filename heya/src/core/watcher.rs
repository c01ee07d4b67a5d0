use super::Desktop;
use crate::error::Result;
use crate::platform::VirtualDesktops;

#[derive(Debug, Clone, PartialEq)]
pub enum DesktopEvent {
    CurrentChanged { old: Desktop, new: Desktop },
    Destroyed { desktop: Desktop },
    Created { desktop: Desktop },
}

/// Derives desktop notifications by diffing successive snapshots.
pub struct DesktopWatcher {
    current: Desktop,
    known: Vec<Desktop>,
}

impl DesktopWatcher {
    pub fn prime<V: VirtualDesktops>(desktops: &V) -> Result<Self> {
        Ok(Self {
            known: desktops.all_desktops()?,
            current: desktops.current_desktop()?,
        })
    }

    pub fn current(&self) -> &Desktop {
        &self.current
    }

    /// Events since the last poll: destructions first, then creations, then
    /// the current-desktop change.
    pub fn poll<V: VirtualDesktops>(&mut self, desktops: &V) -> Result<Vec<DesktopEvent>> {
        let all = desktops.all_desktops()?;
        let current = desktops.current_desktop()?;
        let mut events = Vec::new();

        for gone in self.known.iter().filter(|d| !all.contains(d)) {
            events.push(DesktopEvent::Destroyed {
                desktop: gone.clone(),
            });
        }
        for added in all.iter().filter(|d| !self.known.contains(d)) {
            events.push(DesktopEvent::Created {
                desktop: added.clone(),
            });
        }
        if current != self.current {
            events.push(DesktopEvent::CurrentChanged {
                old: self.current.clone(),
                new: current.clone(),
            });
        }

        if !events.is_empty() {
            tracing::debug!("Desktop events: {:?}", events);
        }
        self.known = all;
        self.current = current;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockDesktops, MockWorld};

    #[test]
    fn test_no_change_no_events() {
        let v = MockDesktops::new(MockWorld::new().with_desktops(&[Some("home")]).shared());
        let mut watcher = DesktopWatcher::prime(&v).unwrap();
        assert!(watcher.poll(&v).unwrap().is_empty());
    }

    #[test]
    fn test_switch_and_create_are_reported() {
        let world = MockWorld::new().with_desktops(&[Some("home")]).shared();
        let v = MockDesktops::new(world.clone());
        let mut watcher = DesktopWatcher::prime(&v).unwrap();
        let home = watcher.current().clone();

        let mail = v.create_desktop().unwrap();
        v.switch_to(&mail).unwrap();

        let events = watcher.poll(&v).unwrap();
        assert_eq!(
            events,
            vec![
                DesktopEvent::Created {
                    desktop: mail.clone()
                },
                DesktopEvent::CurrentChanged {
                    old: home,
                    new: mail
                },
            ]
        );
    }

    #[test]
    fn test_external_removal_is_reported_first() {
        let world = MockWorld::new()
            .with_desktops(&[Some("home"), Some("mail")])
            .with_current(1)
            .shared();
        let v = MockDesktops::new(world.clone());
        let mut watcher = DesktopWatcher::prime(&v).unwrap();
        let mail = watcher.current().clone();

        world.borrow_mut().remove_external(1);

        let events = watcher.poll(&v).unwrap();
        assert!(matches!(&events[0], DesktopEvent::Destroyed { desktop } if *desktop == mail));
        assert!(matches!(&events[1], DesktopEvent::CurrentChanged { old, .. } if *old == mail));
        assert!(mail.is_removed());
    }
}
