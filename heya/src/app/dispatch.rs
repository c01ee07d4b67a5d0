use std::path::Path;
use std::time::Duration;

use heya_ipc::{BindingInfo, Command, PromptInfo, Response, StateInfo};

use super::PromptBroker;
use crate::core::Session;
use crate::error::Result;
use crate::hotkey::BindingStore;
use crate::platform::{NotificationDisplay, VirtualDesktops, WindowSystem};

/// Unified command dispatcher for IPC and hotkey commands.
///
/// Shift variants capture the foreground window before anything else so
/// a prompt taking focus cannot change the migrated window.
pub async fn dispatch_command<V, W, D, B>(
    cmd: &Command,
    session: &Session<V, W, PromptBroker, D>,
    bindings: &B,
) -> Response
where
    V: VirtualDesktops,
    W: WindowSystem,
    D: NotificationDisplay,
    B: BindingStore,
{
    tracing::debug!("Dispatching {:?}", cmd);
    match cmd {
        Command::Switch { name } => to_response(session.switch_to(name).await),
        Command::ShiftSwitch { name } => {
            let window = session.foreground_window();
            to_response(session.shift_switch(name, window).await)
        }
        Command::SwitchLast => to_response(session.switch_to_last().await),
        Command::ShiftSwitchLast => {
            let window = session.foreground_window();
            to_response(session.shift_switch_to_last(window).await)
        }
        Command::SwitchAdjacent { direction } => {
            to_response(session.switch_to_adjacent(*direction).await)
        }
        Command::ShiftSwitchAdjacent { direction } => {
            let window = session.foreground_window();
            to_response(session.shift_switch_to_adjacent(*direction, window).await)
        }
        Command::SwitchPrompt => to_response(session.switch_to_prompt().await),
        Command::ShiftSwitchPrompt => {
            let window = session.foreground_window();
            to_response(session.shift_switch_to_prompt(window).await)
        }
        Command::Rename { name } => to_response(session.rename_current(name)),
        Command::MoveDesktop { index } => to_response(session.move_current_desktop(*index)),
        Command::SetWallpaper { path } => {
            to_response(session.set_current_wallpaper(Path::new(path)))
        }
        Command::PromptAnswer { name } => {
            if session.prompt().answer(name) {
                Response::Ok
            } else {
                error("No prompt is open")
            }
        }
        Command::PromptCancel => {
            if session.prompt().cancel() {
                Response::Ok
            } else {
                error("No prompt is open")
            }
        }
        Command::Bind { key, action } => match bindings.bind(key, (**action).clone()).await {
            Ok(()) => Response::Ok,
            Err(e) => error(e),
        },
        Command::Unbind { key } => match bindings.unbind(key).await {
            Ok(()) => Response::Ok,
            Err(e) => error(e),
        },
        Command::ListBindings => match bindings.list_bindings().await {
            Ok(list) => Response::Bindings {
                bindings: list
                    .into_iter()
                    .map(|(key, command)| BindingInfo {
                        key,
                        action: command.describe(),
                    })
                    .collect(),
            },
            Err(e) => error(e),
        },
        Command::SetNotificationDuration { ms } => {
            session.set_notification_duration(Duration::from_millis(*ms));
            Response::Ok
        }
        Command::SetPromptCommand { command } => {
            session.prompt().set_command(command.clone());
            Response::Ok
        }
        Command::ListDesktops => match session.list_desktops() {
            Ok(desktops) => Response::Desktops { desktops },
            Err(e) => error(e.to_string()),
        },
        Command::GetState => match state_info(session) {
            Ok(state) => Response::State { state },
            Err(e) => error(e.to_string()),
        },
        // The coordination loop stops after answering.
        Command::Quit => Response::Ok,
    }
}

fn to_response(result: Result<()>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(e) if e.is_benign() => {
            tracing::debug!("Command ended early: {}", e);
            Response::Ok
        }
        Err(e) => {
            tracing::warn!("Command failed: {}", e);
            error(e.to_string())
        }
    }
}

fn error(message: impl Into<String>) -> Response {
    Response::Error {
        message: message.into(),
    }
}

fn state_info<V, W, D>(session: &Session<V, W, PromptBroker, D>) -> Result<StateInfo>
where
    V: VirtualDesktops,
    W: WindowSystem,
    D: NotificationDisplay,
{
    let current = session.current()?;
    Ok(StateInfo {
        platform: session.generation().to_string(),
        current: current.name(),
        last: session.last().and_then(|d| d.name()),
        desktop_count: session.desktop_count()?,
        prompt: session.prompt().pending().map(|purpose| PromptInfo {
            purpose: purpose.as_str().to_string(),
        }),
        notification: session.notification_text(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use heya_ipc::Direction;

    use super::*;
    use crate::core::Config;
    use crate::hotkey::mock::MockRegistrar;
    use crate::hotkey::HotkeyManager;
    use crate::platform::mock::{
        MockDesktops, MockDisplay, MockWindowSystem, MockWorld, SharedWorld,
    };

    type TestSession = Session<MockDesktops, MockWindowSystem, PromptBroker, MockDisplay>;
    type TestBindings = RefCell<HotkeyManager<MockRegistrar>>;

    fn setup_test_context(world: &SharedWorld) -> (TestSession, TestBindings) {
        let config = Config {
            notification_duration: Duration::ZERO,
            ..Config::default()
        };
        let session = Session::new(
            MockDesktops::new(world.clone()),
            MockWindowSystem::new(world.clone()),
            PromptBroker::new(None),
            MockDisplay::new(),
            config,
        )
        .unwrap();
        let bindings = RefCell::new(HotkeyManager::new(MockRegistrar::default()));
        (session, bindings)
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    fn two_desktops() -> SharedWorld {
        MockWorld::new()
            .with_desktops(&[Some("home"), Some("mail")])
            .with_window(1, 0)
            .with_window(2, 1)
            .with_foreground(1)
            .shared()
    }

    #[tokio::test]
    async fn test_dispatch_switch() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        let response = dispatch_command(
            &Command::Switch {
                name: "mail".to_string(),
            },
            &session,
            &bindings,
        )
        .await;

        assert!(matches!(response, Response::Ok));
        assert_eq!(world.borrow().current_name().as_deref(), Some("mail"));
    }

    #[tokio::test]
    async fn test_dispatch_shift_switch_uses_foreground_window() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        let response = dispatch_command(
            &Command::ShiftSwitchAdjacent {
                direction: Direction::Right,
            },
            &session,
            &bindings,
        )
        .await;

        assert!(matches!(response, Response::Ok));
        let w = world.borrow();
        // The vacated desktop had no windows left and was removed.
        assert_eq!(w.names(), vec![Some("mail".to_string())]);
        assert_eq!(w.window_desktop(1), Some(w.desktops[0].id));
    }

    #[tokio::test]
    async fn test_dispatch_rename_blank_is_error() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        let response = dispatch_command(
            &Command::Rename {
                name: "  ".to_string(),
            },
            &session,
            &bindings,
        )
        .await;

        assert!(matches!(response, Response::Error { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_list_desktops() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        let response = dispatch_command(&Command::ListDesktops, &session, &bindings).await;

        match response {
            Response::Desktops { desktops } => {
                assert_eq!(desktops.len(), 2);
                assert!(desktops[0].is_current);
                assert_eq!(desktops[1].name.as_deref(), Some("mail"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_get_state() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);
        dispatch_command(&Command::SwitchLast, &session, &bindings).await;
        dispatch_command(
            &Command::Switch {
                name: "mail".to_string(),
            },
            &session,
            &bindings,
        )
        .await;

        let response = dispatch_command(&Command::GetState, &session, &bindings).await;

        match response {
            Response::State { state } => {
                assert_eq!(state.platform, "mock");
                assert_eq!(state.current.as_deref(), Some("mail"));
                assert_eq!(state.last.as_deref(), Some("home"));
                assert_eq!(state.desktop_count, 2);
                assert!(state.prompt.is_none());
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_prompt_answer_completes_switch_prompt() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let world = two_desktops();
                let (session, bindings) = setup_test_context(&world);
                let session = Rc::new(session);
                let bindings = Rc::new(bindings);

                let (s, b) = (session.clone(), bindings.clone());
                let prompt = tokio::task::spawn_local(async move {
                    dispatch_command(&Command::SwitchPrompt, &s, &*b).await
                });
                settle().await;
                assert_eq!(
                    session.prompt().pending(),
                    Some(crate::core::PromptPurpose::Switch)
                );

                let answer = dispatch_command(
                    &Command::PromptAnswer {
                        name: "code".to_string(),
                    },
                    &session,
                    &*bindings,
                )
                .await;
                assert!(matches!(answer, Response::Ok));
                assert!(matches!(prompt.await.unwrap(), Response::Ok));

                assert_eq!(world.borrow().current_name().as_deref(), Some("code"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_dispatch_prompt_cancel() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let world = two_desktops();
                let (session, bindings) = setup_test_context(&world);
                let session = Rc::new(session);
                let bindings = Rc::new(bindings);

                let (s, b) = (session.clone(), bindings.clone());
                let prompt = tokio::task::spawn_local(async move {
                    dispatch_command(&Command::SwitchPrompt, &s, &*b).await
                });
                settle().await;

                let cancel = dispatch_command(&Command::PromptCancel, &session, &*bindings).await;
                assert!(matches!(cancel, Response::Ok));
                assert!(matches!(prompt.await.unwrap(), Response::Ok));
                assert_eq!(world.borrow().current_name().as_deref(), Some("home"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_dispatch_prompt_answer_without_prompt() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        let response = dispatch_command(
            &Command::PromptAnswer {
                name: "mail".to_string(),
            },
            &session,
            &bindings,
        )
        .await;

        assert!(matches!(response, Response::Error { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_bind_and_list() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        let response = dispatch_command(
            &Command::Bind {
                key: "win-ctrl-m".to_string(),
                action: Box::new(Command::Switch {
                    name: "mail".to_string(),
                }),
            },
            &session,
            &bindings,
        )
        .await;
        assert!(matches!(response, Response::Ok));

        let invalid = dispatch_command(
            &Command::Bind {
                key: "win-nope".to_string(),
                action: Box::new(Command::SwitchLast),
            },
            &session,
            &bindings,
        )
        .await;
        assert!(matches!(invalid, Response::Error { .. }));

        match dispatch_command(&Command::ListBindings, &session, &bindings).await {
            Response::Bindings { bindings } => {
                assert_eq!(bindings.len(), 1);
                assert_eq!(bindings[0].key, "win-ctrl-m");
                assert_eq!(bindings[0].action, "switch mail");
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_settings() {
        let world = two_desktops();
        let (session, bindings) = setup_test_context(&world);

        dispatch_command(
            &Command::SetNotificationDuration { ms: 250 },
            &session,
            &bindings,
        )
        .await;
        assert_eq!(
            session.config().notification_duration,
            Duration::from_millis(250)
        );

        let response = dispatch_command(
            &Command::SetPromptCommand {
                command: Some("picker".to_string()),
            },
            &session,
            &bindings,
        )
        .await;
        assert!(matches!(response, Response::Ok));
    }

    #[tokio::test]
    async fn test_dispatch_unsupported_move_is_error() {
        let world = two_desktops();
        let session = Session::new(
            MockDesktops::new(world.clone()).without_reordering(),
            MockWindowSystem::new(world.clone()),
            PromptBroker::new(None),
            MockDisplay::new(),
            Config::default(),
        )
        .unwrap();
        let bindings = RefCell::new(HotkeyManager::new(MockRegistrar::default()));

        let response =
            dispatch_command(&Command::MoveDesktop { index: 1 }, &session, &bindings).await;

        match response {
            Response::Error { message } => {
                assert_eq!(message, "move-desktop is not supported on mock")
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
