mod channels;
mod dispatch;
mod process;
mod prompt_broker;

use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::core::Session;
use crate::hotkey::BindingStore;
use crate::platform::{NotificationDisplay, VirtualDesktops, WindowSystem};
use heya_ipc::{Command, Response};

use dispatch::dispatch_command;

pub use channels::{create_channels, CoordinatorChannels, IpcCommandWithResponse};
pub use prompt_broker::PromptBroker;

pub struct App {}

impl App {
    #[cfg(windows)]
    pub fn run() -> Result<()> {
        use crate::adapter::{select_generation, VersionedAdapter};
        use crate::core::Config;
        use crate::ipc::IpcServer;
        use crate::platform::TracingDisplay;
        use crate::win32::{self, ComApartment, HotkeyThread, Win32WindowSystem};

        let _com = ComApartment::init()?;

        let build = win32::current_build()?;
        let generation = select_generation(build)?;
        tracing::info!("Windows build {} uses {}", build, generation.name());

        let config = Config::new();
        let poll_interval = config.poll_interval;
        let session = Session::new(
            VersionedAdapter::new(generation)?,
            Win32WindowSystem::new()?,
            PromptBroker::new(config.prompt_command.clone()),
            TracingDisplay,
            config,
        )?;

        let (producers, coordinator) = create_channels();
        let shutdown_tx = producers.hotkey_tx.clone();
        let hotkeys = HotkeyThread::spawn(producers.hotkey_tx)?;

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let local = tokio::task::LocalSet::new();
        local.block_on(&rt, async move {
            let server = IpcServer::new(producers.ipc_tx);
            tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    tracing::error!("IPC server error: {}", e);
                }
            });

            tokio::spawn(async move {
                if let Ok(()) = tokio::signal::ctrl_c().await {
                    tracing::info!("Ctrl+C received, shutting down");
                    let _ = shutdown_tx.send(Command::Quit).await;
                }
            });

            process::run_init_script();
            run_loop(Rc::new(session), Rc::new(hotkeys), coordinator, poll_interval).await;
        });

        tracing::info!("Shutting down");
        Ok(())
    }

    #[cfg(not(windows))]
    pub fn run() -> Result<()> {
        anyhow::bail!("heya manages Windows virtual desktops and only runs on Windows")
    }
}

/// Coordination loop. Every command runs as its own local task so a
/// command waiting on a prompt never blocks `prompt-answer`.
pub async fn run_loop<V, W, D, B>(
    session: Rc<Session<V, W, PromptBroker, D>>,
    bindings: Rc<B>,
    mut channels: CoordinatorChannels,
    poll_interval: Duration,
) where
    V: VirtualDesktops + 'static,
    W: WindowSystem + 'static,
    D: NotificationDisplay + 'static,
    B: BindingStore + 'static,
{
    tracing::info!("Coordination loop started");

    let mut tick = tokio::time::interval(poll_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            Some((cmd, resp_tx)) = channels.ipc_rx.recv() => {
                if matches!(cmd, Command::Quit) {
                    let _ = resp_tx.send(Response::Ok).await;
                    break;
                }
                spawn_command(session.clone(), bindings.clone(), cmd, Some(resp_tx));
            }
            Some(cmd) = channels.hotkey_rx.recv() => {
                if matches!(cmd, Command::Quit) {
                    break;
                }
                spawn_command(session.clone(), bindings.clone(), cmd, None);
            }
            _ = tick.tick() => {
                let session = session.clone();
                tokio::task::spawn_local(async move {
                    if let Err(e) = session.process_events().await {
                        tracing::warn!("Failed to handle desktop events: {}", e);
                    }
                });
            }
            else => break,
        }
    }

    tracing::info!("Coordination loop exiting");
}

fn spawn_command<V, W, D, B>(
    session: Rc<Session<V, W, PromptBroker, D>>,
    bindings: Rc<B>,
    cmd: Command,
    resp_tx: Option<mpsc::Sender<Response>>,
) where
    V: VirtualDesktops + 'static,
    W: WindowSystem + 'static,
    D: NotificationDisplay + 'static,
    B: BindingStore + 'static,
{
    tokio::task::spawn_local(async move {
        let response = dispatch_command(&cmd, &session, &*bindings).await;
        let failure = match &response {
            Response::Error { message } => Some(message.clone()),
            _ => None,
        };

        if let Some(resp_tx) = resp_tx {
            let _ = resp_tx.send(response).await;
        }
        if let Some(message) = failure {
            session.report_error(&message).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::Config;
    use crate::hotkey::mock::MockRegistrar;
    use crate::hotkey::HotkeyManager;
    use crate::platform::mock::{
        MockDesktops, MockDisplay, MockWindowSystem, MockWorld, SharedWorld,
    };
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_run_loop_answers_and_quits() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let world = MockWorld::new()
                    .with_desktops(&[Some("home"), Some("mail")])
                    .with_window(1, 0)
                    .with_window(2, 1)
                    .shared();
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

                let (producers, coordinator) = create_channels();
                let looping = tokio::task::spawn_local(run_loop(
                    Rc::new(session),
                    Rc::new(bindings),
                    coordinator,
                    Duration::from_millis(5),
                ));

                let (resp_tx, mut resp_rx) = mpsc::channel(1);
                producers
                    .ipc_tx
                    .send((
                        Command::Switch {
                            name: "mail".to_string(),
                        },
                        resp_tx,
                    ))
                    .await
                    .unwrap();
                assert!(matches!(resp_rx.recv().await, Some(Response::Ok)));
                assert_eq!(world.borrow().current_name().as_deref(), Some("mail"));

                producers
                    .hotkey_tx
                    .send(Command::SwitchLast)
                    .await
                    .unwrap();

                let (resp_tx, mut resp_rx) = mpsc::channel(1);
                producers
                    .ipc_tx
                    .send((Command::Quit, resp_tx))
                    .await
                    .unwrap();
                assert!(matches!(resp_rx.recv().await, Some(Response::Ok)));
                looping.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_run_loop_picks_up_external_switch() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let world = MockWorld::new()
                    .with_desktops(&[Some("home"), Some("mail")])
                    .with_window(1, 0)
                    .with_window(2, 1)
                    .shared();
                let config = Config {
                    notification_duration: Duration::ZERO,
                    ..Config::default()
                };
                let session = Rc::new(
                    Session::new(
                        MockDesktops::new(world.clone()),
                        MockWindowSystem::new(world.clone()),
                        PromptBroker::new(None),
                        MockDisplay::new(),
                        config,
                    )
                    .unwrap(),
                );
                let bindings = RefCell::new(HotkeyManager::new(MockRegistrar::default()));

                let (producers, coordinator) = create_channels();
                let looping = tokio::task::spawn_local(run_loop(
                    session.clone(),
                    Rc::new(bindings),
                    coordinator,
                    Duration::from_millis(1),
                ));

                world.borrow_mut().set_current_external(1);
                for _ in 0..50 {
                    if session.last().is_some() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
                assert_eq!(session.last().unwrap().name().as_deref(), Some("home"));

                let (resp_tx, _resp_rx) = mpsc::channel(1);
                producers
                    .ipc_tx
                    .send((Command::Quit, resp_tx))
                    .await
                    .unwrap();
                looping.await.unwrap();
            })
            .await;
    }

    type TestSession = Session<MockDesktops, MockWindowSystem, PromptBroker, MockDisplay>;

    fn test_session(world: &SharedWorld) -> TestSession {
        let config = Config {
            notification_duration: Duration::ZERO,
            ..Config::default()
        };
        Session::new(
            MockDesktops::new(world.clone()),
            MockWindowSystem::new(world.clone()),
            PromptBroker::new(None),
            MockDisplay::new(),
            config,
        )
        .unwrap()
    }

    /// Binding store whose `bind` replies only once released.
    struct GatedBindings {
        release: Rc<Notify>,
    }

    impl BindingStore for GatedBindings {
        async fn bind(&self, _key: &str, _command: Command) -> Result<(), String> {
            self.release.notified().await;
            Ok(())
        }

        async fn unbind(&self, _key: &str) -> Result<(), String> {
            Ok(())
        }

        async fn list_bindings(&self) -> Result<Vec<(String, Command)>, String> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_pending_binding_request_does_not_stall_hotkeys() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let world = MockWorld::new()
                    .with_desktops(&[Some("home"), Some("mail")])
                    .with_window(1, 0)
                    .with_window(2, 1)
                    .shared();
                let release = Rc::new(Notify::new());
                let bindings = GatedBindings {
                    release: release.clone(),
                };

                let (producers, coordinator) = create_channels();
                let looping = tokio::task::spawn_local(run_loop(
                    Rc::new(test_session(&world)),
                    Rc::new(bindings),
                    coordinator,
                    Duration::from_millis(5),
                ));

                let (resp_tx, mut resp_rx) = mpsc::channel(1);
                producers
                    .ipc_tx
                    .send((
                        Command::Bind {
                            key: "win-ctrl-m".to_string(),
                            action: Box::new(Command::SwitchLast),
                        },
                        resp_tx,
                    ))
                    .await
                    .unwrap();
                producers
                    .hotkey_tx
                    .send(Command::Switch {
                        name: "mail".to_string(),
                    })
                    .await
                    .unwrap();

                for _ in 0..50 {
                    if world.borrow().current_name().as_deref() == Some("mail") {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
                assert_eq!(world.borrow().current_name().as_deref(), Some("mail"));
                assert!(resp_rx.try_recv().is_err());

                release.notify_one();
                assert!(matches!(resp_rx.recv().await, Some(Response::Ok)));

                producers.hotkey_tx.send(Command::Quit).await.unwrap();
                looping.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_run_loop_stops_on_quit_from_hotkey_channel() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let world = MockWorld::new()
                    .with_desktops(&[Some("home")])
                    .with_window(1, 0)
                    .shared();
                let bindings = RefCell::new(HotkeyManager::new(MockRegistrar::default()));

                let (producers, coordinator) = create_channels();
                let looping = tokio::task::spawn_local(run_loop(
                    Rc::new(test_session(&world)),
                    Rc::new(bindings),
                    coordinator,
                    Duration::from_millis(5),
                ));

                producers.hotkey_tx.send(Command::Quit).await.unwrap();
                looping.await.unwrap();
                assert!(producers.hotkey_tx.is_closed());
            })
            .await;
    }
}
