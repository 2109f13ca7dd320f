//! Test Data Builders
//!
//! Builder patterns for constructing test entities with sensible
//! defaults. Tests specify only the fields they care about.

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::remote::RemoteId;
use domain_campaign::campaign::Campaign;
use domain_campaign::criteria::{Criteria, NumericCriteria};
use domain_campaign::message::{Message, MessageRef};
use domain_campaign::segment::{SampleType, Segment, SegmentRef};
use domain_member::member::Member;

/// Builder for test messages
pub struct TestMessageBuilder {
    name: String,
    subject: String,
    to: String,
    body: String,
    remote_id: Option<RemoteId>,
}

impl Default for TestMessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMessageBuilder {
    pub fn new() -> Self {
        Self {
            name: "welcome-message".to_string(),
            subject: "Welcome aboard".to_string(),
            to: SafeEmail().fake(),
            body: "Hello [EMV TEXT]FIRSTNAME[EMV /TEXT]".to_string(),
            remote_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_remote_id(mut self, id: i64) -> Self {
        self.remote_id = Some(RemoteId::new(id));
        self
    }

    pub fn build(self) -> Message {
        let mut message = Message::new(self.name, self.subject, self.to, self.body)
            .with_from("Campaign Team", "team@example.com")
            .with_reply_to("Support", "support@example.com");
        message.remote_id = self.remote_id;
        message
    }
}

/// Builder for test segments
pub struct TestSegmentBuilder {
    name: String,
    remote_id: Option<RemoteId>,
    sampled: bool,
}

impl Default for TestSegmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSegmentBuilder {
    pub fn new() -> Self {
        Self {
            name: "active-subscribers".to_string(),
            remote_id: None,
            sampled: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_remote_id(mut self, id: i64) -> Self {
        self.remote_id = Some(RemoteId::new(id));
        self
    }

    pub fn sampled(mut self) -> Self {
        self.sampled = true;
        self
    }

    pub fn build(self) -> Segment {
        let mut segment = Segment::new(self.name);
        if self.sampled {
            segment = segment.with_sampling(dec!(12.5), SampleType::Percent);
        }
        segment.remote_id = self.remote_id;
        segment
    }
}

/// Builder for test string criteria
pub struct TestCriteriaBuilder {
    column_name: String,
    operator: String,
    values: Vec<String>,
    segment: Option<SegmentRef>,
}

impl Default for TestCriteriaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCriteriaBuilder {
    pub fn new() -> Self {
        Self {
            column_name: "PROVINCE".to_string(),
            operator: "EQUALS".to_string(),
            values: vec!["28".to_string()],
            segment: None,
        }
    }

    pub fn for_segment(mut self, segment: &Segment) -> Self {
        self.segment = Some(SegmentRef::from(segment));
        self
    }

    pub fn build(self) -> Criteria {
        Criteria {
            id: core_kernel::identifiers::CriteriaId::new(),
            group_name: None,
            order_frag: None,
            group_number: None,
            column_name: self.column_name,
            operator: self.operator,
            values: self.values,
            segment: self.segment.unwrap_or(SegmentRef {
                id: core_kernel::identifiers::SegmentId::new(),
                remote_id: None,
            }),
        }
    }

    pub fn build_numeric(self) -> NumericCriteria {
        NumericCriteria {
            id: core_kernel::identifiers::NumericCriteriaId::new(),
            group_name: None,
            order_frag: None,
            group_number: None,
            column_name: self.column_name,
            operator: self.operator,
            first_value: 18,
            second_value: Some(65),
            segment: self.segment.unwrap_or(SegmentRef {
                id: core_kernel::identifiers::SegmentId::new(),
                remote_id: None,
            }),
        }
    }
}

/// Builder for test campaigns
pub struct TestCampaignBuilder {
    name: String,
    segment: Option<SegmentRef>,
    message: Option<MessageRef>,
}

impl Default for TestCampaignBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCampaignBuilder {
    pub fn new() -> Self {
        Self {
            name: "spring-launch".to_string(),
            segment: None,
            message: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn for_segment(mut self, segment: &Segment) -> Self {
        self.segment = Some(SegmentRef::from(segment));
        self
    }

    pub fn for_message(mut self, message: &Message) -> Self {
        self.message = Some(MessageRef::from(message));
        self
    }

    pub fn build(self) -> Campaign {
        Campaign::new(
            self.name,
            "https://example.com/campaign-over",
            self.message.unwrap_or(MessageRef {
                id: core_kernel::identifiers::MessageId::new(),
                remote_id: None,
            }),
            self.segment.unwrap_or(SegmentRef {
                id: core_kernel::identifiers::SegmentId::new(),
                remote_id: None,
            }),
        )
    }
}

/// Builder for test members
pub struct TestMemberBuilder {
    email: String,
    named: bool,
    active: bool,
}

impl Default for TestMemberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMemberBuilder {
    pub fn new() -> Self {
        Self {
            email: SafeEmail().fake(),
            named: true,
            active: true,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.named = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Member {
        let mut member = Member::new(self.email);
        if self.named {
            member = member.with_name(FirstName().fake::<String>(), LastName().fake::<String>());
        }
        member.is_active = self.active;
        member
    }
}
