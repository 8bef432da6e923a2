#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Accountant = 3,
    Supervisor = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Accountant),
            4 => Some(Role::Supervisor),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Declarative allow-list check; every handler gate goes through this.
    pub fn is_allowed(self, allowed: &[Role]) -> bool {
        allowed.contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for role in [Role::Admin, Role::Hr, Role::Accountant, Role::Supervisor] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn allow_list_is_exact() {
        assert!(Role::Hr.is_allowed(&[Role::Hr, Role::Admin]));
        assert!(Role::Admin.is_allowed(&[Role::Hr, Role::Admin]));
        assert!(!Role::Accountant.is_allowed(&[Role::Hr, Role::Admin]));
        assert!(!Role::Supervisor.is_allowed(&[Role::Admin]));
    }
}
