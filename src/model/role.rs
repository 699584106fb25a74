#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Faculty = 2,
    Student = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Faculty),
            3 => Some(Role::Student),
            _ => None,
        }
    }

    /// Role assigned to a self-registered user of the given master-list type.
    pub fn from_user_type(user_type: &str) -> Self {
        match user_type {
            "faculty" => Role::Faculty,
            _ => Role::Student,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for role in [Role::Admin, Role::Faculty, Role::Student] {
            assert_eq!(Role::from_id(role as u8), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn user_type_maps_to_role() {
        assert_eq!(Role::from_user_type("faculty"), Role::Faculty);
        assert_eq!(Role::from_user_type("student"), Role::Student);
        assert_eq!(Role::from_user_type("anything-else"), Role::Student);
    }
}
