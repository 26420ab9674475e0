//! Server stack: web instances in the public subnets, MySQL in the private ones

use super::network::NetworkHandle;
use strata_aws::{
    Credentials, DbEngine, DbInstance, DbSubnetGroup, IngressRule, Instance, MachineImage, Peer,
    RemovalPolicy, Role, SecurityGroup, UserData,
};
use strata_core::{Ref, Result, Stack};

pub const SERVER_STACK: &str = "server";

const WEB_SG: &str = "WebServerSecurityGroup";
const WEB_ROLE: &str = "WebServerRole";
const RDS_SG: &str = "RDSSecurityGroup";
const DB_SUBNET_GROUP: &str = "DBSubnetGroup";

fn own(resource: &str, attribute: &str) -> Ref {
    Ref::new(SERVER_STACK, resource, attribute)
}

/// Apache bootstrap payload; carried as an opaque blob, never interpreted
fn web_bootstrap() -> UserData {
    let mut user_data = UserData::for_linux();
    user_data.add_commands([
        "yum update -y",
        "yum install -y httpd",
        "systemctl start httpd",
        "systemctl enable httpd",
        "echo '<html><h1>Web Server in AZ: $(ec2-metadata --availability-zone | cut -d \" \" -f 2)</h1></html>' > /var/www/html/index.html",
    ]);
    user_data
}

fn web_server(network: &NetworkHandle, subnet: usize) -> Instance {
    Instance {
        instance_type: "t2.micro".to_string(),
        machine_image: MachineImage::AmazonLinux2,
        subnet: network.public_subnet(subnet).into(),
        security_group: own(WEB_SG, "security_group_id").into(),
        role: own(WEB_ROLE, "role_name").into(),
        user_data: Some(web_bootstrap()),
    }
}

/// Declare web servers, the database and the access-control rules wiring them
pub fn server_stack(network: &NetworkHandle) -> Result<Stack> {
    let mut stack = Stack::new(SERVER_STACK);

    let mut web_sg = SecurityGroup::new(network.vpc_id(), "Security group for web servers");
    web_sg.add_ingress_rule(IngressRule::tcp(
        80,
        Peer::AnyIpv4,
        "Allow HTTP traffic from anywhere",
    ));
    stack.add_resource(WEB_SG, web_sg)?;

    let mut role = Role::service("ec2.amazonaws.com");
    role.add_managed_policy("AmazonSSMManagedInstanceCore");
    stack.add_resource(WEB_ROLE, role)?;

    // One web server per public subnet
    stack.add_resource("WebServer1", web_server(network, 1))?;
    stack.add_resource("WebServer2", web_server(network, 2))?;

    let mut rds_sg = SecurityGroup::new(
        network.vpc_id(),
        "Security group for RDS MySQL instance",
    );
    rds_sg.add_ingress_rule(IngressRule::tcp(
        3306,
        Peer::Group(own(WEB_SG, "security_group_id").into()),
        "Allow MySQL traffic from web servers only",
    ));
    stack.add_resource(RDS_SG, rds_sg)?;

    stack.add_resource(
        DB_SUBNET_GROUP,
        DbSubnetGroup {
            description: "Subnet group for RDS instance".to_string(),
            subnet_ids: network.private_subnet_ids().into(),
        },
    )?;

    stack.add_resource(
        "MySQLDatabase",
        DbInstance {
            engine: DbEngine::mysql("8.0"),
            instance_class: "db.t3.micro".to_string(),
            allocated_storage_gb: 20,
            database_name: "myappdatabase".to_string(),
            credentials: Credentials::from_generated_secret("admin"),
            security_groups: vec![own(RDS_SG, "security_group_id").into()],
            subnet_group: own(DB_SUBNET_GROUP, "name").into(),
            multi_az: false,
            publicly_accessible: false,
            // Deliberate: the policy must be stated, never defaulted.
            removal_policy: RemovalPolicy::Retain,
        },
    )?;

    Ok(stack)
}
