use super::ScreenUpdate;

/// Consumer of interpreter output (overlay, notifications, test recorders).
pub trait UpdateHandler {
    fn handle_update(&mut self, update: &ScreenUpdate);

    fn handle_updates(&mut self, updates: &[ScreenUpdate]) {
        for update in updates {
            self.handle_update(update);
        }
    }
}

/// Collects every update it sees.
impl UpdateHandler for Vec<ScreenUpdate> {
    fn handle_update(&mut self, update: &ScreenUpdate) {
        self.push(update.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenType;

    #[test]
    fn test_vec_collects_in_order() {
        let updates = [
            ScreenUpdate::ScreenChanged {
                screen: ScreenType::Battle,
            },
            ScreenUpdate::FloorChanged {
                visit_id: 0,
                floor: 2,
            },
        ];
        let mut seen: Vec<ScreenUpdate> = Vec::new();
        seen.handle_updates(&updates);
        assert_eq!(seen, updates);
    }
}
