use crate::api::attendance::{AttendanceFilter, BulkRowResult, CreateAttendance};
use crate::api::change_request::SubmitRequestDto;
use crate::api::client::{ClientDetail, CreateCategory, CreateClient};
use crate::api::deduction::{CreateDeduction, DeductionFilter};
use crate::api::employee::{CreateEmployee, EmployeeFilter};
use crate::api::invoice::{
    CategoryBreakdown, EmployeeChart, GenerateInvoiceDto, InvoiceBreakdown, InvoiceFilter,
};
use crate::api::salary::{GeneratePayrollDto, SalaryFilter};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::change_request::{ChangeRequest, ProtectedTable, RequestAction, RequestStatus};
use crate::model::client::{Client, ClientCategory};
use crate::model::deduction::Deduction;
use crate::model::employee::Employee;
use crate::model::invoice::{Invoice, InvoiceLine};
use crate::model::salary::Salary;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GuardPay API",
        version = "1.0.0",
        description = r#"
## GuardPay — payroll & billing for security staffing

Backend for a security-services staffing company: clients and their price
lists, deployed employees, daily attendance, deductions, payroll and GST
invoicing.

### 🔹 Key Features
- **Attendance Lifecycle**
  - Daily session records (0/1/2 units) with pending/approved/rejected status
  - Supervisor submissions always land pending; HR/Admin entries auto-approve
- **Change Requests**
  - Non-admin edits/deletes of protected entities queue for admin approval
  - Approval applies the mutation transactionally; replays are rejected
- **Payroll**
  - Per-employee salary snapshots from approved attendance (30-day rate basis)
- **Invoicing**
  - Per-client, per-category billing with CGST/SGST and attendance charts

### 🔐 Security
All business endpoints require **JWT Bearer authentication**; operations are
gated by role (Admin, HR, Accountant, Supervisor).

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::create_attendance,
        crate::api::attendance::create_attendance_bulk,
        crate::api::attendance::approve_attendance,
        crate::api::attendance::reject_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::change_request::submit_request,
        crate::api::change_request::list_requests,
        crate::api::change_request::approve_request,
        crate::api::change_request::reject_request,

        crate::api::client::create_client,
        crate::api::client::add_category,
        crate::api::client::list_clients,
        crate::api::client::get_client,
        crate::api::client::update_client,
        crate::api::client::delete_client,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::deduction::create_deduction,
        crate::api::deduction::list_deductions,
        crate::api::deduction::delete_deduction,

        crate::api::salary::generate_salaries,
        crate::api::salary::list_salaries,
        crate::api::salary::delete_salary,

        crate::api::invoice::generate_invoice,
        crate::api::invoice::list_invoices,
        crate::api::invoice::delete_invoice
    ),
    components(
        schemas(
            Attendance,
            AttendanceStatus,
            AttendanceFilter,
            CreateAttendance,
            BulkRowResult,
            ChangeRequest,
            RequestAction,
            RequestStatus,
            ProtectedTable,
            SubmitRequestDto,
            Client,
            ClientCategory,
            ClientDetail,
            CreateClient,
            CreateCategory,
            Employee,
            CreateEmployee,
            EmployeeFilter,
            Deduction,
            CreateDeduction,
            DeductionFilter,
            Salary,
            GeneratePayrollDto,
            SalaryFilter,
            Invoice,
            InvoiceLine,
            GenerateInvoiceDto,
            InvoiceFilter,
            InvoiceBreakdown,
            CategoryBreakdown,
            EmployeeChart
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance lifecycle APIs"),
        (name = "ChangeRequest", description = "Admin-approved edit/delete workflow"),
        (name = "Client", description = "Client and price-list APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Deduction", description = "Deduction APIs"),
        (name = "Salary", description = "Payroll generation APIs"),
        (name = "Invoice", description = "Client billing APIs"),
    )
)]
pub struct ApiDoc;
