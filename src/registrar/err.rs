use super::registration::{RequestId, RequestStatus};

/// 选课、审批与成绩流程中的业务错误
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegistrarError {
    /// 同一学生对同一课程已有待处理的申请
    #[error("a registration request for {course} is already pending for {student}")]
    DuplicateRegistration { student: String, course: String },
    /// 课程已在当前或已完成列表中
    #[error("{course} is already registered for {student}")]
    AlreadyRegistered { student: String, course: String },
    /// 退课时课程不在当前列表中
    #[error("{course} is not registered for {student}")]
    NotRegistered { student: String, course: String },
    /// 超出学分上限
    #[error("exceeding credits: {current} + {requested} > {max}")]
    CreditLimitExceeded {
        current: u32,
        requested: u32,
        max: u32,
    },
    /// 研究者资质不足
    #[error("h-index {h_index} is too low, at least {required} is needed")]
    LowQualification { h_index: u32, required: u32 },
    /// 选课窗口已关闭
    #[error("course registration is closed")]
    RegistrationClosed,
    #[error("unknown student: {0}")]
    UnknownStudent(String),
    #[error("unknown person: {0}")]
    UnknownPerson(String),
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    /// 课程仍被选课记录或待处理申请引用
    #[error("course {0} is still referenced by registrations or pending requests")]
    CourseInUse(String),
    #[error("unknown request kind: {0}, expected add or drop")]
    InvalidRequestKind(String),
    #[error("unknown registration request: {0}")]
    UnknownRequest(RequestId),
    /// 申请已经处理过
    #[error("request {id} was already decided ({status:?})")]
    RequestAlreadyDecided { id: RequestId, status: RequestStatus },
    #[error("{0} has no research profile")]
    NotAResearcher(String),
    #[error("{0} is not a graduate student")]
    NotAGraduateStudent(String),
}

/// 快照读写错误
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// 文件读写失败
    #[error("读取或写入快照失败: {0}")]
    Io(#[from] std::io::Error),
    /// json 编解码失败
    #[error("解析快照失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 快照内容不一致
    #[error("非法的快照: {0}")]
    InvalidSnapshot(String),
}

/// 课程目录导入错误
#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    /// 文件读取失败
    #[error("读取文件失败: {0}")]
    Io(#[from] std::io::Error),
    /// csv处理错误
    #[error("解析csv失败: {0}")]
    Csv(#[from] csv::Error),
    /// regex相关错误
    #[error("failed to parse or compile a regular expression: {0}")]
    Regex(#[from] regex::Error),
    /// 课程代码不符合要求
    #[error("非法的课程代码: {0}")]
    InvalidCourseCode(String),
    /// csv数据不符合预期
    #[error("csv数据错误: {0}")]
    InvalidField(String),
    /// 引用了目录中不存在的课程
    #[error("unknown course: {0}")]
    UnknownCourse(String),
}

pub type Result<T> = std::result::Result<T, RegistrarError>;

/// 配置错误
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 环境变量的值无法解析
    #[error("非法的配置 {key}={value}")]
    InvalidValue { key: String, value: String },
}
