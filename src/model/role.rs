#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Manager = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Manager),
            _ => None,
        }
    }

    /// Roles allowed to see other employees' attendance and act for them.
    pub fn is_supervisor(self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_ids() {
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(4), Some(Role::Manager));
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn employees_are_not_supervisors() {
        assert!(!Role::Employee.is_supervisor());
        assert!(Role::Manager.is_supervisor());
        assert!(Role::Hr.is_supervisor());
    }
}
