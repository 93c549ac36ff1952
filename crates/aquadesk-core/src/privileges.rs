//! Privilege and role name constants for the AquaDesk API.
//!
//! Privileges are granted to roles in the `role_privileges` table and reach
//! users only through their roles. Use these constants instead of string
//! literals when checking access in handlers.
//!
//! # Example
//!
//! ```ignore
//! use aquadesk_core::privileges;
//!
//! if principal.has_privilege(privileges::ASSIGN_TICKETS) {
//!     // Reassign the ticket
//! }
//! ```

// =============================================================================
// Tickets
// =============================================================================

/// View customer tickets
pub const VIEW_TICKETS: &str = "view_tickets";
/// Assign tickets to agents
pub const ASSIGN_TICKETS: &str = "assign_tickets";
/// Close or resolve tickets
pub const CLOSE_TICKETS: &str = "close_tickets";

// =============================================================================
// Contracts and work orders
// =============================================================================

/// Look up customer supply contracts
pub const VIEW_CONTRACTS: &str = "view_contracts";
/// Create work orders in the field-service system
pub const CREATE_WORK_ORDERS: &str = "create_work_orders";

// =============================================================================
// Administration
// =============================================================================

/// Manage users and their role assignments
pub const MANAGE_USERS: &str = "manage_users";

/// Every privilege known to the application, in display order.
pub const ALL: &[&str] = &[
    VIEW_TICKETS,
    ASSIGN_TICKETS,
    CLOSE_TICKETS,
    VIEW_CONTRACTS,
    CREATE_WORK_ORDERS,
    MANAGE_USERS,
];

/// Standard role names seeded by the CLI.
pub mod roles {
    pub const SUPPORT_AGENT: &str = "support_agent";
    pub const SUPERVISOR: &str = "supervisor";
    pub const ADMIN: &str = "admin";

    /// Privileges each standard role is seeded with.
    pub const GRANTS: &[(&str, &[&str])] = &[
        (
            SUPPORT_AGENT,
            &[super::VIEW_TICKETS, super::ASSIGN_TICKETS],
        ),
        (
            SUPERVISOR,
            &[
                super::VIEW_TICKETS,
                super::ASSIGN_TICKETS,
                super::CLOSE_TICKETS,
                super::VIEW_CONTRACTS,
                super::CREATE_WORK_ORDERS,
            ],
        ),
        (ADMIN, super::ALL),
    ];
}
