//! Fixed test IDs for deterministic tests
//!
//! Directory ids mirror what a fresh site would hand out so assertions on
//! resolved participant rules can use literal values.

use common::types::{CourseId, GroupId};

// Courses
pub const TEST_COURSE_ID: CourseId = CourseId(2);
pub const TEST_COURSE_FULLNAME: &str = "Test course 1";
pub const TEST_COURSE_SHORTNAME: &str = "tc1";

// Groups
pub const TEST_GROUP_ID: GroupId = GroupId(7);

// Roles (1-99)
pub const TEST_ROLE_EDITINGTEACHER: i64 = 3;
pub const TEST_ROLE_TEACHER: i64 = 4;
pub const TEST_ROLE_STUDENT: i64 = 5;

// Users (100-199)
pub const TEST_USER_ALICE: i64 = 100;
pub const TEST_USER_BOB: i64 = 101;
pub const TEST_USER_CHARLIE: i64 = 102;

// Meeting ids (40 hex characters, like generated ones)
pub const TEST_MEETINGID: &str = "0123456789abcdef0123456789abcdef01234567";

// Recording ids returned by mock servers
pub const TEST_RECORD_ID: &str = "rec-0001";
pub const TEST_RECORD_ID_2: &str = "rec-0002";
