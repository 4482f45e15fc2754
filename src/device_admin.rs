//! Device-administration enable/disable hook.
//!
//! The platform calls in when elevated device-management privileges are
//! granted or revoked. Each transition runs the platform's default handler
//! and shows a short notification. No policy is applied and nothing is
//! read or written.

/// Notification shown when device admin is granted.
pub const ENABLED_MESSAGE: &str = "Safe Mobile: Device Admin Enabled";

/// Notification shown when device admin is revoked.
pub const DISABLED_MESSAGE: &str = "Safe Mobile: Device Admin Disabled";

/// Platform notification surface. Messages are short-lived (a toast on Android).
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Platform-side handling that runs before the notification.
pub trait DeviceAdminPlatform {
    fn on_enabled(&self) {
        tracing::info!("Device admin enabled");
    }

    fn on_disabled(&self) {
        tracing::info!("Device admin disabled");
    }
}

/// Default platform with no extra behaviour.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPlatform;

impl DeviceAdminPlatform for DefaultPlatform {}

/// Writes notifications to the log. Used where no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("{message}");
    }
}

pub struct DeviceAdminReceiver<N, P = DefaultPlatform> {
    notifier: N,
    platform: P,
}

impl<N: Notifier> DeviceAdminReceiver<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            platform: DefaultPlatform,
        }
    }
}

impl<N: Notifier, P: DeviceAdminPlatform> DeviceAdminReceiver<N, P> {
    pub fn with_platform(notifier: N, platform: P) -> Self {
        Self { notifier, platform }
    }

    pub fn on_enabled(&self) {
        self.platform.on_enabled();
        self.notifier.notify(ENABLED_MESSAGE);
    }

    pub fn on_disabled(&self) {
        self.platform.on_disabled();
        self.notifier.notify(DISABLED_MESSAGE);
    }
}
