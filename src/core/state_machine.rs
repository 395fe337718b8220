//! The display power state machine.
//!
//! A single, non-reentrant handler runs to completion for every inbound
//! event before the next one is dispatched (enforced one level up, by
//! [crate::control::daemon::PowerDaemon]). Every handler below reads the
//! current state, optionally calls into the [Environment] collaborators, and
//! updates state - nothing here suspends and nothing here can fail.

use super::collaborators::Environment;
use super::types::{
    AllowanceVector, DisplayPowerChangeReason, DisplayPowerMode, InactivityTimeout,
    InactivityTimeoutAllowance, PressSnapshot, ProximityState,
};
use std::time::Duration;
use tokio::time::Instant;

/// Immutable (after construction) configuration for a [PowerStateMachine].
#[derive(Debug, Clone, Copy)]
pub struct PowerStateMachineConfig {
    pub power_button_long_press_timeout: Duration,
    pub user_inactivity_normal_display_dim_duration: Duration,
    pub user_inactivity_reduced_display_off_timeout: Duration,
}

pub struct PowerStateMachine<E: Environment> {
    env: E,
    config: PowerStateMachineConfig,

    display_power_mode: DisplayPowerMode,
    display_power_mode_at_power_button_press: PressSnapshot,

    power_button_long_press_alarm_id: Option<super::types::AlarmId>,
    power_button_long_press_detected: bool,

    user_inactivity_display_dim_alarm_id: Option<super::types::AlarmId>,
    user_inactivity_display_off_alarm_id: Option<super::types::AlarmId>,
    user_inactivity_display_off_time_point: Option<Instant>,

    user_inactivity_normal_display_off_timeout: InactivityTimeout,

    inactivity_timeout_allowances: AllowanceVector,
}

impl<E: Environment> PowerStateMachine<E> {
    pub fn new(
        env: E,
        config: PowerStateMachineConfig,
        initial_normal_display_off_timeout: InactivityTimeout,
    ) -> Self {
        PowerStateMachine {
            env,
            config,
            display_power_mode: DisplayPowerMode::Off,
            display_power_mode_at_power_button_press: PressSnapshot::Unknown,
            power_button_long_press_alarm_id: None,
            power_button_long_press_detected: false,
            user_inactivity_display_dim_alarm_id: None,
            user_inactivity_display_off_alarm_id: None,
            user_inactivity_display_off_time_point: None,
            user_inactivity_normal_display_off_timeout: initial_normal_display_off_timeout,
            inactivity_timeout_allowances: AllowanceVector::new(),
        }
    }

    /// Current display power mode, for diagnostics/tests.
    pub fn display_power_mode(&self) -> DisplayPowerMode {
        self.display_power_mode
    }

    #[cfg(test)]
    pub(crate) fn env(&self) -> &E {
        &self.env
    }

    // ---- Alarm expiry ----------------------------------------------------

    pub fn handle_alarm(&mut self, id: super::types::AlarmId) {
        if self.power_button_long_press_alarm_id == Some(id) {
            self.env.notify_long_press();
            self.power_button_long_press_detected = true;
            self.power_button_long_press_alarm_id = None;
        } else if self.user_inactivity_display_dim_alarm_id == Some(id) {
            self.user_inactivity_display_dim_alarm_id = None;
            if self.is_inactivity_timeout_allowed() {
                self.dim_display();
            }
        } else if self.user_inactivity_display_off_alarm_id == Some(id) {
            self.user_inactivity_display_off_alarm_id = None;
            if self.is_inactivity_timeout_allowed() {
                self.turn_off_display(DisplayPowerChangeReason::Activity);
            }
        } else {
            log::debug!(
                "handle_alarm: id {:?} matches no tracked alarm, ignoring (cancel/fire race)",
                id
            );
        }
    }

    // ---- Power button ---------------------------------------------------

    pub fn handle_power_button_press(&mut self) {
        self.display_power_mode_at_power_button_press = self.display_power_mode.into();
        if self.display_power_mode == DisplayPowerMode::Off {
            self.turn_on_display_with_normal_timeout(DisplayPowerChangeReason::PowerButton);
        }
        self.power_button_long_press_alarm_id = Some(
            self.env
                .schedule_alarm_in(self.config.power_button_long_press_timeout),
        );
    }

    pub fn handle_power_button_release(&mut self) {
        if self.power_button_long_press_detected {
            self.power_button_long_press_detected = false;
        } else if self.display_power_mode_at_power_button_press == PressSnapshot::On {
            self.turn_off_display(DisplayPowerChangeReason::PowerButton);
        }
        self.display_power_mode_at_power_button_press = PressSnapshot::Unknown;
        self.power_button_long_press_alarm_id = None;
    }

    // ---- User activity --------------------------------------------------

    pub fn handle_user_activity_changing_power_state(&mut self) {
        if self.display_power_mode == DisplayPowerMode::On {
            self.brighten_display();
            self.schedule_normal_user_inactivity_alarm();
        } else if self.env.proximity_state() == ProximityState::Far {
            self.turn_on_display_with_normal_timeout(DisplayPowerChangeReason::Activity);
        }
    }

    pub fn handle_user_activity_extending_power_state(&mut self) {
        if self.display_power_mode == DisplayPowerMode::On {
            self.brighten_display();
            self.schedule_normal_user_inactivity_alarm();
        }
    }

    // ---- Notifications --------------------------------------------------

    pub fn handle_notification(&mut self) {
        self.disallow_inactivity_timeout(InactivityTimeoutAllowance::Notification);
        if self.display_power_mode == DisplayPowerMode::On {
            self.brighten_display();
        } else if self.env.proximity_state() == ProximityState::Far {
            self.turn_on_display_without_timeout(DisplayPowerChangeReason::Notification);
        }
    }

    pub fn handle_no_notification(&mut self) {
        if self.display_power_mode == DisplayPowerMode::On {
            self.schedule_reduced_user_inactivity_alarm();
        }
        self.allow_inactivity_timeout(InactivityTimeoutAllowance::Notification);
    }

    // ---- Active call ----------------------------------------------------

    pub fn handle_active_call(&mut self) {
        if self.display_power_mode == DisplayPowerMode::On {
            self.brighten_display();
            self.schedule_normal_user_inactivity_alarm();
        } else if self.env.proximity_state() == ProximityState::Far {
            self.turn_on_display_with_normal_timeout(DisplayPowerChangeReason::Call);
        }
        self.env.enable_proximity_events();
    }

    pub fn handle_no_active_call(&mut self) {
        if self.display_power_mode == DisplayPowerMode::On {
            self.brighten_display();
            self.schedule_reduced_user_inactivity_alarm();
        } else if self.env.proximity_state() == ProximityState::Far {
            self.turn_on_display_without_timeout(DisplayPowerChangeReason::CallDone);
            self.schedule_reduced_user_inactivity_alarm();
        }
        self.env.disable_proximity_events();
    }

    // ---- Proximity ------------------------------------------------------

    pub fn handle_proximity_far(&mut self) {
        if self.display_power_mode == DisplayPowerMode::Off {
            self.turn_on_display_with_normal_timeout(DisplayPowerChangeReason::Proximity);
        }
    }

    pub fn handle_proximity_near(&mut self) {
        if self.display_power_mode == DisplayPowerMode::On {
            self.turn_off_display(DisplayPowerChangeReason::Proximity);
        }
    }

    // ---- External turn-on request ----------------------------------------

    pub fn handle_turn_on_display(&mut self) {
        if self.display_power_mode == DisplayPowerMode::Off {
            self.turn_on_display_with_normal_timeout(DisplayPowerChangeReason::Unknown);
        }
    }

    // ---- Client-initiated timeout controls ---------------------------------

    pub fn handle_enable_inactivity_timeout(&mut self) {
        self.allow_inactivity_timeout(InactivityTimeoutAllowance::Client);
    }

    pub fn handle_disable_inactivity_timeout(&mut self) {
        self.disallow_inactivity_timeout(InactivityTimeoutAllowance::Client);
    }

    pub fn handle_set_inactivity_timeout(&mut self, timeout: InactivityTimeout) {
        self.user_inactivity_normal_display_off_timeout = timeout;
    }

    // ---- Inactivity scheduling algorithm ------------------------------------

    fn cancel_user_inactivity_alarm(&mut self) {
        if let Some(id) = self.user_inactivity_display_dim_alarm_id.take() {
            self.env.cancel_alarm(id);
        }
        if let Some(id) = self.user_inactivity_display_off_alarm_id.take() {
            self.env.cancel_alarm(id);
        }
        self.user_inactivity_display_off_time_point = None;
    }

    fn schedule_normal_user_inactivity_alarm(&mut self) {
        self.cancel_user_inactivity_alarm();

        let normal_off_timeout = match self.user_inactivity_normal_display_off_timeout.finite() {
            Some(d) => d,
            None => {
                log::debug!("normal inactivity timeout is infinite, arming no alarm");
                return;
            }
        };

        let now = self.env.now();
        self.user_inactivity_display_off_time_point = Some(now + normal_off_timeout);

        let dim_duration = self.config.user_inactivity_normal_display_dim_duration;
        if normal_off_timeout > dim_duration {
            self.user_inactivity_display_dim_alarm_id = Some(
                self.env
                    .schedule_alarm_in(normal_off_timeout - dim_duration),
            );
        }
        self.user_inactivity_display_off_alarm_id =
            Some(self.env.schedule_alarm_in(normal_off_timeout));
    }

    fn schedule_reduced_user_inactivity_alarm(&mut self) {
        let reduced_off_timeout = self.config.user_inactivity_reduced_display_off_timeout;
        let candidate = self.env.now() + reduced_off_timeout;
        let is_later = match self.user_inactivity_display_off_time_point {
            None => true,
            Some(current_deadline) => candidate > current_deadline,
        };
        if is_later {
            self.cancel_user_inactivity_alarm();
            self.user_inactivity_display_off_alarm_id =
                Some(self.env.schedule_alarm_in(reduced_off_timeout));
            self.user_inactivity_display_off_time_point = Some(candidate);
        }
    }

    // ---- Display-transition primitives ---------------------------------------

    fn turn_off_display(&mut self, reason: DisplayPowerChangeReason) {
        self.env.set_off_brightness();
        self.env.turn_off();
        self.display_power_mode = DisplayPowerMode::Off;
        self.cancel_user_inactivity_alarm();
        self.env.notify_display_power_off(reason);
    }

    fn turn_on_display_with_normal_timeout(&mut self, reason: DisplayPowerChangeReason) {
        self.env.turn_on();
        self.display_power_mode = DisplayPowerMode::On;
        self.brighten_display();
        self.schedule_normal_user_inactivity_alarm();
        self.env.notify_display_power_on(reason);
    }

    fn turn_on_display_without_timeout(&mut self, reason: DisplayPowerChangeReason) {
        self.env.turn_on();
        self.env.set_normal_brightness();
        self.display_power_mode = DisplayPowerMode::On;
        self.env.notify_display_power_on(reason);
    }

    fn brighten_display(&mut self) {
        self.env.set_normal_brightness();
    }

    fn dim_display(&mut self) {
        self.env.set_dim_brightness();
    }

    // ---- Allowance vector -----------------------------------------------------

    fn allow_inactivity_timeout(&mut self, allowance: InactivityTimeoutAllowance) {
        if !self.is_inactivity_timeout_allowed() {
            self.inactivity_timeout_allowances.set(allowance, true);
            if self.is_inactivity_timeout_allowed()
                && self.display_power_mode == DisplayPowerMode::On
                && self.user_inactivity_display_off_alarm_id.is_none()
            {
                self.turn_off_display(DisplayPowerChangeReason::Activity);
            }
        }
    }

    fn disallow_inactivity_timeout(&mut self, allowance: InactivityTimeoutAllowance) {
        self.inactivity_timeout_allowances.set(allowance, false);
    }

    fn is_inactivity_timeout_allowed(&self) -> bool {
        self.inactivity_timeout_allowances.all_allowed()
    }
}
