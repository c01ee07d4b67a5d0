use std::cell::RefCell;
use std::rc::Rc;

use crate::platform::NotificationDisplay;

struct Visibility {
    holders: usize,
    text: Option<String>,
}

/// Reference-counted notification visibility.
///
/// Overlapping `show` calls collapse into one visible notification which
/// stays up while any guard is alive and shows the most recent text.
pub struct NotificationCenter<D: NotificationDisplay> {
    display: Rc<D>,
    visibility: Rc<RefCell<Visibility>>,
}

impl<D: NotificationDisplay> NotificationCenter<D> {
    pub fn new(display: D) -> Self {
        Self {
            display: Rc::new(display),
            visibility: Rc::new(RefCell::new(Visibility {
                holders: 0,
                text: None,
            })),
        }
    }

    pub fn show(&self, text: &str) -> NotificationGuard<D> {
        {
            let mut v = self.visibility.borrow_mut();
            v.holders += 1;
            v.text = Some(text.to_string());
        }
        self.display.show(text);
        NotificationGuard {
            display: self.display.clone(),
            visibility: self.visibility.clone(),
        }
    }

    /// Text currently on screen.
    pub fn current_text(&self) -> Option<String> {
        self.visibility.borrow().text.clone()
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

#[must_use = "the notification is hidden when the guard is dropped"]
pub struct NotificationGuard<D: NotificationDisplay> {
    display: Rc<D>,
    visibility: Rc<RefCell<Visibility>>,
}

impl<D: NotificationDisplay> Drop for NotificationGuard<D> {
    fn drop(&mut self) {
        let hide = {
            let mut v = self.visibility.borrow_mut();
            v.holders -= 1;
            if v.holders == 0 {
                v.text = None;
            }
            v.holders == 0
        };
        if hide {
            self.display.hide();
        }
    }
}
