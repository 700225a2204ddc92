use crate::api::access::{AccessGrants, ManagedUser, ReplaceAccess};
use crate::api::attendance::{ClockRequest, DayStateResponse, MonthSummary};
use crate::api::profile::PushTokenReq;
use crate::api::task::{
    AddTaskUpdate, AssignableUser, CompleteTask, CreateTask, TaskUpdateResponse,
};
use crate::domain::calendar::{DayCell, DayClass, MonthGrid};
use crate::model::attendance::AttendanceRecord;
use crate::model::task::{TaskPriority, TaskSummary};
use crate::model::user::Profile;
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Attendance & Task Tracker

Backend for a mobile attendance app: staff clock in and out with a
photo and GPS fix, browse a calendar of their attendance history, and
receive assigned tasks.

### 🔹 Key Features
- **Attendance**
  - Photo + location evidence on every clock-in and clock-out
  - Derived day state drives what the client may do next
  - Month calendar with per-day classification
- **Tasks**
  - Assign, complete, and post progress updates
  - Push notification to the assignee's device on assignment
- **Admin**
  - Per-user grants controlling who may assign tasks to whom

### 🔐 Security
All endpoints under the API prefix require **JWT Bearer authentication**.
Admin endpoints additionally require the admin role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::attendance::list_attendance,
        crate::api::attendance::day_state,
        crate::api::attendance::calendar,
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::month_summary,

        crate::api::task::list_received,
        crate::api::task::list_assigned,
        crate::api::task::create_task,
        crate::api::task::assignable_users,
        crate::api::task::complete_task,
        crate::api::task::list_updates,
        crate::api::task::add_update,

        crate::api::access::list_users,
        crate::api::access::get_access,
        crate::api::access::put_access,

        crate::api::profile::get_profile,
        crate::api::profile::put_push_token
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,

            AttendanceRecord,
            DayStateResponse,
            MonthGrid,
            DayCell,
            DayClass,
            ClockRequest,
            MonthSummary,

            TaskSummary,
            TaskPriority,
            CreateTask,
            AssignableUser,
            CompleteTask,
            TaskUpdateResponse,
            AddTaskUpdate,

            ManagedUser,
            AccessGrants,
            ReplaceAccess,

            Profile,
            PushTokenReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and token APIs"),
        (name = "Attendance", description = "Clock-in/out and calendar APIs"),
        (name = "Tasks", description = "Task assignment and progress APIs"),
        (name = "Admin", description = "Access-grant management APIs"),
        (name = "Profile", description = "Own profile and push token APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
